use cookiemonster::cookies::cookiedate::parse_cookie_date;
use cookiemonster::cookies::memorystore::MemoryCookieStore;
use cookiemonster::cookies::monster::CookieMonster;
use cookiemonster::cookies::options::{GetCookieOptions, SetCookieOptions};
use cookiemonster::cookies::parsedcookie::{ParseOptions, ParsedCookie};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

const SET_COOKIE: &str =
    "sid=31d4d96e407aad42; Path=/; Domain=example.com; Secure; HttpOnly; SameSite=Lax; \
     Expires=Wed, 09 Jun 2038 10:18:14 GMT";

fn benchmark_cookie_parse(c: &mut Criterion) {
    let options = ParseOptions::default();
    c.bench_function("cookie_parse", |b| {
        b.iter(|| black_box(ParsedCookie::parse(black_box(SET_COOKIE), &options)))
    });

    c.bench_function("cookie_date_parse", |b| {
        b.iter(|| black_box(parse_cookie_date(black_box("Wed, 09 Jun 2038 10:18:14 GMT"))))
    });
}

fn benchmark_cookie_insert(c: &mut Criterion) {
    let mut jar = CookieMonster::new();
    let url = Url::parse("https://www.example.com").unwrap();
    let options = SetCookieOptions::default();

    c.bench_function("cookie_set", |b| {
        b.iter(|| {
            black_box(jar.set_cookie(black_box(SET_COOKIE), black_box(&url), &options)).ok();
        })
    });
}

fn benchmark_cookie_get(c: &mut Criterion) {
    let mut jar = CookieMonster::new();
    let url = Url::parse("https://www.example.com/foo/bar").unwrap();
    // Pre-populate
    for i in 0..100 {
        jar.set_cookie(
            &format!("cookie{}=val; Path=/foo", i),
            &url,
            &SetCookieOptions::default(),
        )
        .ok();
    }
    let options = GetCookieOptions::default();

    c.bench_function("cookie_get_for_url", |b| {
        b.iter(|| {
            black_box(jar.get_cookies(black_box(&url), &options)).ok();
        })
    });
}

fn benchmark_async_get(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut jar = CookieMonster::with_store(MemoryCookieStore::new(), Default::default());
    let url = Url::parse("https://www.example.com/").unwrap();
    for i in 0..20 {
        jar.set_cookie(&format!("c{}=v", i), &url, &SetCookieOptions::default())
            .ok();
    }
    let options = GetCookieOptions::default();

    c.bench_function("cookie_string_async", |b| {
        b.iter(|| {
            runtime
                .block_on(jar.get_cookie_string_async(black_box(&url), &options))
                .ok()
        })
    });
}

criterion_group!(
    benches,
    benchmark_cookie_parse,
    benchmark_cookie_insert,
    benchmark_cookie_get,
    benchmark_async_get
);
criterion_main!(benches);

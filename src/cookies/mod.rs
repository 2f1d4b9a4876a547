//! Cookie storage.
//!
//! | Type | Responsibility |
//! |------|----------------|
//! | [`CookieJar`](jar::CookieJar) | Shared, clonable jar with RFC 6265 matching |
//! | [`CanonicalCookie`](canonicalcookie::CanonicalCookie) | Single cookie representation |
//! | [`psl`] | Public suffix checks for `Domain=` attributes |
//!
//! A jar captured from one response can be handed to the next request:
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), fluentnet::HttpError> {
//! use fluentnet::Http;
//!
//! let login = Http::get("https://example.com/login", &()).await?;
//! let profile = Http::with_cookies(login.cookies().clone())
//!     .get("https://example.com/me", &())
//!     .await?;
//! # let _ = profile;
//! # Ok(())
//! # }
//! ```
//!
//! Jars serialize to the Netscape format used by curl and wget:
//!
//! ```rust,no_run
//! use fluentnet::cookies::jar::CookieJar;
//!
//! let jar = CookieJar::new();
//! std::fs::write("cookies.txt", jar.export_netscape(None))?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod canonicalcookie;
pub mod jar;
pub mod psl;

pub use canonicalcookie::CanonicalCookie;
pub use jar::CookieJar;

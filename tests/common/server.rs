//! Local HTTP stubs for OCSP responders, CRL distribution points and the
//! signing service.

use std::net::SocketAddr;
use std::time::Duration;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

pub type Routes = BoxedFilter<(Response,)>;

/// Serve `routes` on an ephemeral localhost port for the rest of the test.
pub fn serve(routes: Routes) -> SocketAddr {
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

/// `POST /ocsp/<name>/<delay_ms>`: answers `ocsp-<name>` after the delay,
/// 500 for names starting with `fail`, 415 without the OCSP content type.
/// The request body must be `req-<name>`.
pub fn ocsp_responder() -> Routes {
    warp::post()
        .and(warp::path!("ocsp" / String / u64))
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .and_then(
            |name: String, delay_ms: u64, content_type: Option<String>, body: warp::hyper::body::Bytes| async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                let reply = if content_type.as_deref() != Some("application/ocsp-request") {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response()
                } else if name.starts_with("fail") {
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                } else if body.as_ref() != format!("req-{name}").as_bytes() {
                    StatusCode::BAD_REQUEST.into_response()
                } else {
                    format!("ocsp-{name}").into_response()
                };
                Ok::<_, warp::Rejection>(reply)
            },
        )
        .boxed()
}

/// `GET /crl/der`: raw bytes; `GET /crl/pem`: the same bytes PEM-armored
/// with CRLF line endings; `GET /crl/missing`: 404.
pub fn crl_distribution_point(der: Vec<u8>) -> Routes {
    let pem = armor_crl(&der);
    let der_route = warp::get()
        .and(warp::path!("crl" / "der"))
        .map(move || der.clone().into_response());
    let pem_route = warp::get()
        .and(warp::path!("crl" / "pem"))
        .map(move || pem.clone().into_response());
    let missing = warp::get()
        .and(warp::path!("crl" / "missing"))
        .map(|| StatusCode::NOT_FOUND.into_response());
    der_route
        .or(pem_route)
        .unify()
        .or(missing)
        .unify()
        .boxed()
}

pub fn armor_crl(der: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    let b64 = STANDARD.encode(der);
    let mut pem = String::from("-----BEGIN X509 CRL-----\r\n");
    for chunk in b64.as_bytes().chunks(64) {
        pem.push_str(std::str::from_utf8(chunk).unwrap());
        pem.push_str("\r\n");
    }
    pem.push_str("-----END X509 CRL-----\r\n");
    pem
}

/// Merge two route sets.
pub fn both(a: Routes, b: Routes) -> Routes {
    a.or(b).unify().boxed()
}

/// `POST /sign`: requires `Authorization: Bearer <token>` and echoes the
/// digest and the `profile` option back inside the container.
pub fn signing_service(token: &'static str) -> Routes {
    warp::post()
        .and(warp::path!("sign"))
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json::<serde_json::Value>())
        .map(move |auth: Option<String>, body: serde_json::Value| {
            if auth.as_deref() != Some(format!("Bearer {token}").as_str()) {
                return warp::reply::with_status(
                    warp::reply::json(&serde_json::json!({ "error": "unauthorized" })),
                    StatusCode::UNAUTHORIZED,
                )
                .into_response();
            }
            let digest = body["digest"].as_str().unwrap_or_default();
            if digest == "no-cms" {
                return warp::reply::json(&serde_json::json!({ "status": "ok" })).into_response();
            }
            let profile = body["profile"].as_str().unwrap_or("none");
            warp::reply::json(&serde_json::json!({ "cms": format!("CMS[{digest}|{profile}]") }))
                .into_response()
        })
        .boxed()
}

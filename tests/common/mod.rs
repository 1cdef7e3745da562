use std::num::NonZeroU64;

use blogdesk::config::ApiSettings;
use blogdesk::infra::http::HttpTransport;
use httpmock::MockServer;
use url::Url;

pub fn transport(server: &MockServer) -> HttpTransport {
    let settings = ApiSettings {
        base_url: Url::parse(&server.base_url()).expect("base url"),
        timeout_seconds: NonZeroU64::new(5).expect("non-zero"),
    };
    HttpTransport::new(&settings).expect("transport")
}

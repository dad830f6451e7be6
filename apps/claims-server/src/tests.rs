//! Tests for the claims server
//!
//! - Header value sanitizing (property tests)
//! - HTTP endpoints through the full router with axum-test; presentation
//!   delays are zeroed so SSE streams run to completion at once

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::api::content_disposition;

    #[test]
    fn test_content_disposition_replaces_unsafe_characters() {
        assert_eq!(
            content_disposition("insurance_report_Città \"A\".pdf"),
            "attachment; filename=\"insurance_report_Citt_ _A_.pdf\""
        );
    }

    proptest! {
        /// Property: the header value is always representable
        #[test]
        fn content_disposition_is_valid_header(name in "\\PC{0,40}") {
            let value = content_disposition(&name);
            prop_assert!(axum::http::HeaderValue::from_str(&value).is_ok());
        }
    }
}

#[cfg(test)]
mod http_tests {
    //! HTTP endpoint integration tests using axum-test

    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use dashboard_core::{DashboardConfig, PresentationConfig};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tempfile::TempDir;

    use crate::{router, AppState};

    /// Server over an empty image directory; keep the `TempDir` alive
    fn create_test_server() -> (TestServer, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            image_dir: dir.path().to_path_buf(),
            presentation: PresentationConfig {
                char_delay_ms: 0,
                line_delay_ms: 0,
            },
            ..DashboardConfig::default()
        };
        let server = TestServer::new(router(AppState::new(config).unwrap())).unwrap();
        (server, dir)
    }

    fn write_png(path: &std::path::Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(std::io::BufWriter::new(file), 2, 2);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[200u8; 12]).unwrap();
    }

    /// Event names in the order they appear in an SSE body
    fn event_names(body: &str) -> Vec<&str> {
        body.lines()
            .filter_map(|line| line.strip_prefix("event: "))
            .collect()
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let (server, _dir) = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "claims-server");
    }

    #[tokio::test]
    async fn test_list_claims() {
        let (server, _dir) = create_test_server();
        let response = server.get("/api/claims").await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["count"], 45);
        assert_eq!(json["claims"][0]["id"], 1);
        assert_eq!(json["claims"][44]["id"], 45);
        assert_eq!(json["claims"][0]["status"], "pending");
    }

    #[tokio::test]
    async fn test_claim_lookup() {
        let (server, _dir) = create_test_server();
        let response = server.get("/api/claims/3").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["claim"]["id"], 3);
    }

    #[tokio::test]
    async fn test_unknown_claim_is_404() {
        let (server, _dir) = create_test_server();
        for uri in ["/api/claims/0", "/api/claims/46"] {
            let response = server.get(uri).await;
            response.assert_status(StatusCode::NOT_FOUND);

            let json = response.json::<Value>();
            assert_eq!(json["success"], false);
            assert_eq!(json["code"], "CLAIM_NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_history_filter() {
        let (server, _dir) = create_test_server();
        let response = server
            .get("/api/history")
            .add_query_param("q", "lagrange")
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["sections"].as_array().unwrap().len(), 1);
        assert_eq!(json["sections"][0]["title"], "Yesterday");
        assert_eq!(json["sections"][0]["items"][0], "Via Lagrange, 3");
    }

    #[tokio::test]
    async fn test_index_page() {
        let (server, _dir) = create_test_server();
        let response = server.get("/").await;
        response.assert_status_ok();

        let html = response.text();
        assert!(html.contains("Starview Model 1.0.0"));
        assert!(html.contains("Search the property address/postal code/claim code"));
        assert!(html.contains("<span class=\"value\">775</span>"));
        assert!(html.contains("<span class=\"value\">45</span>"));
        assert!(html.contains("8/10/2024"));
        assert!(html.contains("Pending Claim #45"));
    }

    #[tokio::test]
    async fn test_report_stream_runs_to_end() {
        let (server, _dir) = create_test_server();
        let response = server
            .get("/api/report/stream")
            .add_query_param("q", "Via Garibaldi 12")
            .await;
        response.assert_status_ok();

        let body = response.text();
        let names = event_names(&body);
        assert_eq!(names.first(), Some(&"report_started"));
        assert_eq!(names.last(), Some(&"end"));
        assert!(names.contains(&"report_line"));
        assert!(names.contains(&"report_complete"));
        // No images in the temp dir
        assert!(names.contains(&"notice"));
        assert!(body.contains("No images found for Via Garibaldi 12"));
        assert!(body.contains("High-level damage"));
    }

    #[tokio::test]
    async fn test_report_stream_records_history() {
        let (server, _dir) = create_test_server();
        server
            .get("/api/report/stream")
            .add_query_param("q", "Via Verdi 76")
            .await
            .assert_status_ok();

        let json = server.get("/api/history").await.json::<Value>();
        assert_eq!(json["sections"][0]["title"], "Today");
        assert_eq!(json["sections"][0]["items"][0], "Via Verdi 76");
    }

    #[tokio::test]
    async fn test_empty_query_stream_only_warns() {
        let (server, _dir) = create_test_server();
        let response = server
            .get("/api/report/stream")
            .add_query_param("q", " ")
            .await;
        response.assert_status_ok();

        let body = response.text();
        assert_eq!(event_names(&body), vec!["notice", "end"]);
        assert!(body.contains("\"level\":\"warning\""));
    }

    #[tokio::test]
    async fn test_export_requires_ready_report() {
        let (server, _dir) = create_test_server();
        let response = server.post("/api/report/export").await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["code"], "REPORT_NOT_READY");
    }

    #[tokio::test]
    async fn test_export_after_stream() {
        let (server, _dir) = create_test_server();
        server
            .get("/api/report/stream")
            .add_query_param("q", "Via Roma 45")
            .await
            .assert_status_ok();

        let response = server.post("/api/report/export").await;
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"insurance_report_Via Roma 45.pdf\""
        );
        assert!(response.as_bytes().starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_stream_sends_images_when_present() {
        let (server, dir) = create_test_server();
        write_png(&dir.path().join("via_garibaldi_12_before.png"));
        write_png(&dir.path().join("via_garibaldi_12_after.png"));

        let response = server
            .get("/api/report/stream")
            .add_query_param("q", "Via Garibaldi 12")
            .await;
        response.assert_status_ok();

        let body = response.text();
        let names = event_names(&body);
        assert_eq!(
            names[names.len() - 3..].to_vec(),
            vec!["report_complete", "images", "end"]
        );
        assert!(body.contains("data:image/png;base64,"));
        assert!(body.contains("Before Event"));
        assert!(!names.contains(&"notice"));
    }

    #[tokio::test]
    async fn test_blank_search_keeps_report_exportable() {
        let (server, _dir) = create_test_server();
        server
            .get("/api/report/stream")
            .add_query_param("q", "Via Roma 45")
            .await
            .assert_status_ok();

        let body = server
            .get("/api/report/stream")
            .add_query_param("q", "   ")
            .await
            .text();
        assert_eq!(event_names(&body), vec!["notice", "end"]);

        let response = server.post("/api/report/export").await;
        response.assert_status_ok();
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"insurance_report_Via Roma 45.pdf\""
        );
    }
}

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

/// Binary response with a `Content-Disposition: attachment` header, used by
/// file downloads and zip exports.
pub fn attachment_response(filename: &str, content_type: &str, bytes: Vec<u8>) -> Response {
    // Quotes would break the header value
    let safe_name = filename.replace(['"', '\r', '\n'], "_");
    let disposition = format!("attachment; filename=\"{}\"", safe_name);

    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_str(content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
        )
        .header(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
        )
        .body(Body::from(bytes))
        .expect("attachment response is always well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_download_headers() {
        let response = attachment_response("jugement.pdf", "application/pdf", vec![1, 2, 3]);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"jugement.pdf\""
        );
    }

    #[test]
    fn header_breaking_characters_are_neutralized() {
        let response = attachment_response("a\"b\r\n.pdf", "application/pdf", vec![]);
        let value = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(value, "attachment; filename=\"a_b__.pdf\"");
    }
}

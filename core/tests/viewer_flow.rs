use fattura_core::{
    get_download_state, resolve_payload, should_handle_invoice, DownloadMode, DownloadStateInput,
    InterceptPolicy, InvoiceArtifact, ResolveErrorKind, ViewerSession, XmlBytesMessage,
    LABEL_P7M, LABEL_XML,
};

static PLAIN_INVOICE: &[u8] = include_bytes!("../../sample-invoices/IT01234567890_FPA01.xml");
static SIGNED_INVOICE: &[u8] =
    include_bytes!("../../sample-invoices/IT01234567890_FPA01.xml.p7m");
static CHUNKED_INVOICE: &[u8] =
    include_bytes!("../../sample-invoices/IT01234567890_FPA01_chunked.xml.p7m");
static DETACHED: &[u8] = include_bytes!("../../sample-invoices/detached.xml.p7m");
static PLAIN_OTHER: &[u8] = include_bytes!("../../sample-invoices/not_an_invoice.xml");
static SIGNED_OTHER: &[u8] = include_bytes!("../../sample-invoices/not_an_invoice.xml.p7m");

fn session_for(artifact: &InvoiceArtifact) -> ViewerSession {
    let json = artifact.to_message().to_json().unwrap();
    ViewerSession::from_message(XmlBytesMessage::from_json(&json).unwrap())
}

#[test]
fn test_signed_invoice_end_to_end() {
    let artifact = InvoiceArtifact::new(
        SIGNED_INVOICE.to_vec(),
        "IT01234567890_FPA01.xml.p7m",
        "application/pkcs7-mime",
    );
    assert!(artifact.should_handle(&InterceptPolicy::default()));

    let session = session_for(&artifact);
    let outcome = session.load();
    let payload = outcome.payload.as_ref().unwrap();
    assert_eq!(payload.filename, "IT01234567890_FPA01.xml");
    assert_eq!(payload.xml_content.as_bytes(), PLAIN_INVOICE);
    assert!(payload.xml_content.contains("Società"));
    assert_eq!(outcome.download.mode, Some(DownloadMode::Xml));
    assert_eq!(outcome.download.label, Some(LABEL_XML));

    let download = session.download_artifact(&outcome).unwrap().unwrap();
    assert_eq!(download.filename, "IT01234567890_FPA01.xml");
    assert_eq!(download.mime_type, "application/xml");
    assert_eq!(download.bytes, PLAIN_INVOICE);
}

#[test]
fn test_chunked_envelope_matches_primitive() {
    let b64 = fattura_core::encode_base64(CHUNKED_INVOICE);
    let chunked = resolve_payload(&b64, "IT01234567890_FPA01.xml.p7m").unwrap();
    assert_eq!(chunked.xml_content.as_bytes(), PLAIN_INVOICE);
}

#[test]
fn test_octet_stream_label_only_with_default_policy() {
    let artifact = InvoiceArtifact::new(
        SIGNED_INVOICE.to_vec(),
        "IT01234567890_FPA01.xml.p7m",
        "application/octet-stream",
    );
    assert!(artifact.should_handle(&InterceptPolicy::default()));
    assert!(!artifact.should_handle(&InterceptPolicy::strict()));
}

#[test]
fn test_plain_non_invoice_is_not_intercepted() {
    let name = "IT01234567890_FPA01.xml";
    assert!(should_handle_invoice("application/xml", name, Some(PLAIN_INVOICE)));
    assert!(!should_handle_invoice("application/xml", "order.xml", Some(PLAIN_OTHER)));
    assert!(!should_handle_invoice("text/html", name, Some(PLAIN_INVOICE)));
    assert!(!should_handle_invoice("application/pkcs7-mime", "contract.pdf.p7m", None));
}

#[test]
fn test_signed_non_invoice_falls_back_to_original() {
    let artifact = InvoiceArtifact::new(
        SIGNED_OTHER.to_vec(),
        "order.xml.p7m",
        "application/pkcs7-mime",
    );
    let session = session_for(&artifact);
    let outcome = session.load();

    let err = outcome.payload.as_ref().unwrap_err();
    assert_eq!(err.kind(), ResolveErrorKind::NotAnInvoice);
    assert_eq!(err.user_message(), "Signed XML is not a FatturaPA invoice.");
    assert_eq!(outcome.download.label, Some(LABEL_P7M));

    let download = session.download_artifact(&outcome).unwrap().unwrap();
    assert_eq!(download.filename, "order.xml.p7m");
    assert_eq!(download.bytes, SIGNED_OTHER);
}

#[test]
fn test_detached_signature_reports_empty_content() {
    let b64 = fattura_core::encode_base64(DETACHED);
    let session = ViewerSession::new(b64, Some("detached.xml.p7m"));
    let outcome = session.load();
    let err = outcome.payload.as_ref().unwrap_err();
    assert_eq!(err.kind(), ResolveErrorKind::EmptyContent);
    assert_eq!(err.user_message(), "No embedded content in PKCS#7 envelope.");
    assert_eq!(outcome.download.mode, Some(DownloadMode::P7m));
}

#[test]
fn test_message_without_filename_is_treated_as_plain_xml() {
    let json = format!(
        r#"{{"kind":"XML_BYTES_B64","b64":"{}"}}"#,
        fattura_core::encode_base64(PLAIN_OTHER)
    );
    let session = ViewerSession::from_message(XmlBytesMessage::from_json(&json).unwrap());
    assert_eq!(session.filename(), "download.xml");

    // Unsigned payloads are shown as is, invoice or not.
    let outcome = session.load();
    assert_eq!(outcome.payload.unwrap().xml_content.as_bytes(), PLAIN_OTHER);
}

#[test]
fn test_download_state_for_failed_plain_xml() {
    let state = get_download_state(&DownloadStateInput {
        xml_content: None,
        original_filename: Some("IT01234567890_FPA01.xml"),
        original_b64: Some("AAAA"),
        had_error: true,
    });
    assert!(!state.is_enabled());
}

#[test]
fn test_policy_from_json() {
    let policy =
        InterceptPolicy::from_json(r#"{"allowed_mime_types":["application/xml"]}"#).unwrap();
    assert_eq!(policy.invoice_marker, "<FatturaElettronicaHeader");
    assert!(policy.should_handle("APPLICATION/XML", "a.xml", Some(PLAIN_INVOICE)));
    assert!(!policy.should_handle("application/pkcs7-mime", "a.xml.p7m", Some(SIGNED_INVOICE)));
    assert!(InterceptPolicy::from_json("[1, 2]").is_err());
}

#[test]
fn test_configured_marker_is_used_by_the_viewer() {
    let policy = InterceptPolicy::from_json(r#"{"invoice_marker":"<Ordine"}"#).unwrap();
    let artifact = InvoiceArtifact::new(
        SIGNED_INVOICE.to_vec(),
        "IT01234567890_FPA01.xml.p7m",
        "application/pkcs7-mime",
    );
    assert!(artifact.should_handle(&policy));

    let outcome = session_for(&artifact).with_policy(policy).load();
    assert_eq!(
        outcome.payload.unwrap_err().kind(),
        ResolveErrorKind::NotAnInvoice
    );
}

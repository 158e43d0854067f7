//! EC2 error XML formatting and error types.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// Errors that can occur during XML serialization.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),
}

/// Format an EC2 error envelope.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Response>
///   <Errors>
///     <Error><Code>InvalidAction</Code><Message>...</Message></Error>
///   </Errors>
///   <RequestId>...</RequestId>
/// </Response>
/// ```
#[must_use]
pub fn error_to_xml(code: &str, message: &str, request_id: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(e) = write_error_xml(&mut buf, code, message, request_id) {
        tracing::error!(error = %e, "failed to serialize EC2 error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(buf: &mut Vec<u8>, code: &str, message: &str, request_id: &str) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer.create_element("Response").write_inner_content(|w| {
        w.create_element("Errors").write_inner_content(|w| {
            w.create_element("Error").write_inner_content(|w| {
                w.create_element("Code")
                    .write_text_content(BytesText::new(code))?;
                w.create_element("Message")
                    .write_text_content(BytesText::new(message))?;
                Ok(())
            })?;
            Ok(())
        })?;
        w.create_element("RequestId")
            .write_text_content(BytesText::new(request_id))?;
        Ok(())
    })?;

    Ok(())
}

use keysync::{
    ExportOptions, Keyset, TankerClient, Transport, formats::TankerFormat, traits::Parser,
};

use crate::validation::{ValidationContext, validate_context};
use crate::view::render_json;

/// Export filters and output choice for `keysync pull`.
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    pub languages: Vec<String>,
    pub status: Option<String>,
    pub safe: bool,
    pub json: bool,
}

/// Downloads `name` and renders it as wire XML or JSON.
pub fn pull_keyset<T: Transport>(
    client: &TankerClient<T>,
    name: &str,
    options: &PullOptions,
) -> Result<String, String> {
    let mut context = ValidationContext::new().with_keyset_name(name.to_string());
    for lang in &options.languages {
        context = context.with_language_code(lang.clone());
    }
    validate_context(&context)?;

    let export = ExportOptions::new()
        .with_languages(options.languages.clone())
        .with_status(options.status.clone())
        .with_safe(options.safe);
    let keyset: Keyset = client
        .load_keyset(name, &export)
        .map_err(|e| format!("Failed to load keyset {}: {}", name, e))?;

    if options.json {
        return render_json([&keyset]);
    }

    let bytes = TankerFormat::new(client.config().project_id.clone(), vec![keyset])
        .to_bytes()
        .map_err(|e| format!("Failed to write keyset {}: {}", name, e))?;
    String::from_utf8(bytes).map_err(|e| format!("Keyset {} is not valid UTF-8: {}", name, e))
}

pub fn run_pull_command<T: Transport>(
    client: &TankerClient<T>,
    name: &str,
    options: &PullOptions,
) -> Result<(), String> {
    println!("{}", pull_keyset(client, name, options)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keysync::client::{Request, Response};
    use keysync::{Error, TankerConfig};
    use std::cell::RefCell;

    const EXPORT: &str = concat!(
        r#"<tanker><project id="p"><keyset id="Resources/Localizable.strings">"#,
        r#"<key id="Hello" is_plural="False"><context>greeting</context>"#,
        r#"<value language="fr" status="approved">Bonjour</value></key>"#,
        r#"</keyset></project></tanker>"#
    );

    struct Export(RefCell<Option<Request>>);

    impl Transport for Export {
        fn send(&self, _: &str, _: &str, request: &Request) -> Result<Response, Error> {
            self.0.replace(Some(request.clone()));
            Ok(Response {
                status: 200,
                body: EXPORT.to_string(),
            })
        }
    }

    fn client() -> TankerClient<Export> {
        TankerClient::with_transport(
            TankerConfig {
                endpoint: "http://localhost".to_string(),
                token: String::new(),
                project_id: "p".to_string(),
            },
            Export(RefCell::new(None)),
        )
    }

    #[test]
    fn test_pull_renders_wire_xml() {
        let client = client();
        let options = PullOptions {
            languages: vec!["fr".to_string()],
            status: Some("approved".to_string()),
            safe: true,
            json: false,
        };
        let xml = pull_keyset(&client, "Resources/Localizable.strings", &options).unwrap();
        assert_eq!(
            xml,
            format!(r#"<?xml version="1.0" encoding="UTF-8"?>{}"#, EXPORT)
        );

        let request = client.transport().0.borrow().clone().unwrap();
        assert_eq!(request.param("language"), Some("fr"));
        assert_eq!(request.param("status"), Some("approved"));
        assert_eq!(request.param("safe"), Some("true"));
    }

    #[test]
    fn test_pull_json() {
        let options = PullOptions {
            json: true,
            ..PullOptions::default()
        };
        let json = pull_keyset(&client(), "Resources/Localizable.strings", &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["keys"]["Hello"]["context"], "greeting");
    }

    #[test]
    fn test_pull_rejects_bad_language() {
        let options = PullOptions {
            languages: vec!["not a language".to_string()],
            ..PullOptions::default()
        };
        let client = client();
        let err = pull_keyset(&client, "ks", &options).unwrap_err();
        assert!(err.contains("Language code validation failed"));
        assert!(client.transport().0.borrow().is_none());
    }
}

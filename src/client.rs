//! Client for the translation service's keyset API.
//!
//! Every call is a single blocking HTTP round-trip. Requests are first built
//! as plain [`Request`] values and then handed to a [`Transport`];
//! [`HttpTransport`] sends them with `reqwest`, tests can substitute their own.
//!
//! Success and redirection responses are parsed as XML. Any other status is
//! turned into [`Error::Service`] carrying the text of the body's
//! `<result><error>` element.

use std::fmt::{self, Display};

use reqwest::{
    blocking::{
        Client,
        multipart::{Form, Part},
    },
    header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
    redirect::Policy,
};
use tracing::{debug, info, warn};

use crate::{
    config::TankerConfig,
    error::Error,
    formats::tanker::write_envelope,
    types::Keyset,
    xml::Document,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    /// Sent with `filename="<file_name>"`, `application/octet-stream` and binary transfer encoding.
    File {
        name: String,
        file_name: String,
        content: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// An XML attachment; the file name is derived from the field name.
    pub fn xml_file(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        FormPart::File {
            file_name: format!("{}.xml", name),
            name,
            content,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// A request relative to the configured endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<FormPart>,
}

impl Request {
    fn get(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query,
            form: Vec::new(),
        }
    }

    fn post(path: impl Into<String>, form: Vec<FormPart>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            form,
        }
    }

    fn delete(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            query,
            form: Vec::new(),
        }
    }

    /// Value of a text form field or query parameter called `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find_map(|part| match part {
                FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
                _ => None,
            })
            .or_else(|| {
                self.query
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.as_str())
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

/// Carries a [`Request`] to the service and returns the raw response.
///
/// Connection-level failures are returned as [`Error::Transport`].
pub trait Transport {
    fn send(&self, endpoint: &str, token: &str, request: &Request) -> Result<Response, Error>;
}

/// Blocking HTTP transport.
///
/// Redirects are not followed: a 3xx response is handed back as is and its
/// body parsed like any other successful reply.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self { client })
    }

    /// Uses a caller-built client as is, including its redirect policy.

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: &str, token: &str, request: &Request) -> Result<Response, Error> {
        let url = format!("{}{}", endpoint, request.path);
        let transport_error = |source: reqwest::Error| Error::Transport {
            method: request.method.to_string(),
            url: url.clone(),
            source,
        };

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        }
        .header(AUTHORIZATION, token);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.form.is_empty() {
            builder = builder.multipart(multipart_form(&request.form).map_err(transport_error)?);
        }

        let response = builder.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        Ok(Response { status, body })
    }
}

fn multipart_form(parts: &[FormPart]) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                content,
            } => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    HeaderName::from_static("content-transfer-encoding"),
                    HeaderValue::from_static("binary"),
                );
                let file = Part::bytes(content.clone())
                    .file_name(file_name.clone())
                    .mime_str("application/octet-stream")?
                    .headers(headers);
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

/// Filters for [`TankerClient::export_project`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub keyset: Option<String>,
    pub languages: Vec<String>,
    pub status: Option<String>,
    /// Ask the service to leave out values that are not safe to ship.
    pub safe: bool,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyset(mut self, keyset: Option<String>) -> Self {
        self.keyset = keyset;
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    fn query(&self, project_id: &str) -> Vec<(String, String)> {
        let mut query = vec![("project-id".to_string(), project_id.to_string())];
        if let Some(keyset) = &self.keyset {
            query.push(("keyset-id".to_string(), keyset.clone()));
        }
        if !self.languages.is_empty() {
            query.push(("language".to_string(), self.languages.join(",")));
        }
        if let Some(status) = &self.status {
            query.push(("status".to_string(), status.clone()));
        }
        if self.safe {
            query.push(("safe".to_string(), "true".to_string()));
        }
        query
    }
}

/// Translation service client bound to one project.
#[derive(Debug, Clone)]
pub struct TankerClient<T = HttpTransport> {
    config: TankerConfig,
    transport: T,
}

impl TankerClient<HttpTransport> {
    pub fn new(config: TankerConfig) -> Result<Self, Error> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> TankerClient<T> {
    pub fn with_transport(config: TankerConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &TankerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ids of all keysets in the project, in the order the service lists them.
    pub fn list_keysets(&self) -> Result<Vec<String>, Error> {
        let doc = self.execute(Request::get("/keysets/", self.project_query()))?;
        Ok(doc
            .find_all("keyset")
            .into_iter()
            .filter_map(|keyset| keyset.attribute("id"))
            .map(str::to_string)
            .collect())
    }

    pub fn create_keyset(&self, name: &str) -> Result<(), Error> {
        info!(keyset = name, "creating keyset");
        self.execute(Request::post(
            "/keysets/create/",
            vec![
                FormPart::text("project-id", &self.config.project_id),
                FormPart::text("keyset-id", name),
            ],
        ))?;
        Ok(())
    }

    /// Uploads `keyset` as the new remote content, optionally restricted to one language.
    pub fn replace_keyset(&self, keyset: &Keyset, language: Option<&str>) -> Result<(), Error> {
        let mut payload = Vec::new();
        write_envelope(
            &mut payload,
            &self.config.project_id,
            std::slice::from_ref(keyset),
            language,
        )?;

        let mut form = vec![
            FormPart::xml_file("file", payload),
            FormPart::text("project-id", &self.config.project_id),
            FormPart::text("keyset-id", &keyset.name),
            FormPart::text("format", "xml"),
        ];
        if let Some(language) = language {
            form.push(FormPart::text("language", language));
        }

        info!(
            keyset = %keyset.name,
            keys = keyset.len(),
            language = language.unwrap_or("*"),
            "replacing keyset"
        );
        self.execute(Request::post("/keysets/replace/", form))?;
        Ok(())
    }

    /// Exports the project (or the parts selected by `options`) as an XML document.
    pub fn export_project(&self, options: &ExportOptions) -> Result<Document, Error> {
        self.execute(Request::get(
            "/projects/export/xml/",
            options.query(&self.config.project_id),
        ))
    }

    /// Exports and parses one keyset.
    ///
    /// Returns an empty keyset called `name` when the export does not contain it.
    pub fn load_keyset(&self, name: &str, options: &ExportOptions) -> Result<Keyset, Error> {
        let options = options.clone().with_keyset(Some(name.to_string()));
        let doc = self.export_project(&options)?;

        for element in doc.find_all("keyset") {
            if element.attribute("id") != Some(name) {
                continue;
            }
            let keyset = Keyset::from_element(element);
            if keyset.name == name {
                return Ok(keyset);
            }
        }

        warn!(keyset = name, "keyset missing from export, starting empty");
        Ok(Keyset::new(name))
    }

    pub fn drop_keyset(&self, name: &str) -> Result<(), Error> {
        info!(keyset = name, "dropping keyset");
        self.execute(Request::delete(
            format!("/admin/project/{}/keyset/", self.config.project_id),
            vec![("keyset".to_string(), name.to_string())],
        ))?;
        Ok(())
    }

    fn project_query(&self) -> Vec<(String, String)> {
        vec![("project-id".to_string(), self.config.project_id.clone())]
    }

    fn execute(&self, request: Request) -> Result<Document, Error> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response =
            self.transport
                .send(&self.config.endpoint, &self.config.token, &request)?;

        let malformed = |detail: String| Error::MalformedResponse {
            method: request.method.to_string(),
            path: request.path.clone(),
            status: response.status,
            detail,
        };

        let doc = Document::parse_str(&response.body);
        if (200..400).contains(&response.status) {
            return doc.map_err(|e| malformed(e.to_string()));
        }

        let doc = doc.map_err(|e| malformed(e.to_string()))?;
        match doc.find_nested("result", "error") {
            Some(error) => Err(Error::Service {
                method: request.method.to_string(),
                path: request.path.clone(),
                message: error.text(),
            }),
            None => Err(malformed("no <result><error> element in body".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_query_defaults_to_project_only() {
        let query = ExportOptions::new().query("p");
        assert_eq!(query, vec![("project-id".to_string(), "p".to_string())]);
    }

    #[test]
    fn test_export_query_with_all_filters() {
        let query = ExportOptions::new()
            .with_keyset(Some("Resources/Localizable.strings".to_string()))
            .with_languages(vec!["en".to_string(), "fr".to_string()])
            .with_status(Some("approved".to_string()))
            .with_safe(true)
            .query("p");
        let keys: Vec<_> = query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["project-id", "keyset-id", "language", "status", "safe"]
        );
        assert_eq!(query[2].1, "en,fr");
        assert_eq!(query[4].1, "true");
    }

    #[test]
    fn test_xml_file_part_name() {
        let part = FormPart::xml_file("file", b"<tanker/>".to_vec());
        assert_eq!(part.name(), "file");
        assert!(matches!(part, FormPart::File { ref file_name, .. } if file_name == "file.xml"));
    }

    #[test]
    fn test_request_param_looks_at_form_and_query() {
        let request = Request::post("/keysets/create/", vec![FormPart::text("keyset-id", "ks")]);
        assert_eq!(request.param("keyset-id"), Some("ks"));
        let request = Request::delete("/x/", vec![("keyset".to_string(), "ks".to_string())]);
        assert_eq!(request.param("keyset"), Some("ks"));
        assert_eq!(request.param("missing"), None);
    }

    #[test]
    fn test_multipart_form_builds() {
        let parts = vec![
            FormPart::xml_file("file", b"<tanker/>".to_vec()),
            FormPart::text("format", "xml"),
        ];
        assert!(multipart_form(&parts).is_ok());
    }
}

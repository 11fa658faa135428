//! CSV export of a list view's result set.
//!
//! With the export flag in the query string (`?export=csv` unless
//! configured otherwise) the list view answers with a CSV attachment instead
//! of the rendered page: a header row of the model's field names, then one
//! row per object in the same column order. Fields are quoted per RFC 4180
//! and rows end in CRLF.

use std::borrow::Cow;

use async_trait::async_trait;
use http::header::CONTENT_DISPOSITION;
use http::HeaderValue;

use viewkit_core::{Settings, ViewError, ViewResult};
use viewkit_db::{ModelMeta, Record};
use viewkit_http::{HttpRequest, HttpResponse};

use crate::mixin::{Context, ViewMixin};

/// Answers export requests with a CSV attachment.
///
/// An object lacking a value for one of the model's fields fails the whole
/// export with [`ViewError::MissingAttribute`].
#[derive(Debug, Clone)]
pub struct CsvExport {
    param: String,
    value: String,
}

impl Default for CsvExport {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CsvExport {
    /// Creates a stage triggered by `?export=csv`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stage triggered by the configured parameter and value.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            param: settings.export_param.clone(),
            value: settings.export_csv_value.clone(),
        }
    }

    /// Returns `true` if the request asks for an export.
    pub fn is_requested(&self, request: &HttpRequest) -> bool {
        request.get().get(&self.param) == Some(self.value.as_str())
    }

    /// Builds the CSV document for `objects`.
    ///
    /// ```
    /// use viewkit_db::{FieldDef, FieldType, ModelMeta, Record};
    /// use viewkit_views::CsvExport;
    ///
    /// let meta = ModelMeta::new("Item")
    ///     .field(FieldDef::new("id", FieldType::AutoField).primary_key())
    ///     .field(FieldDef::new("name", FieldType::CharField));
    /// let objects = vec![
    ///     Record::new().with("id", 1_i64).with("name", "x"),
    ///     Record::new().with("id", 2_i64).with("name", "y, z"),
    /// ];
    /// let csv = CsvExport::new().build_csv(&meta, &objects).unwrap();
    /// assert_eq!(csv, "id,name\r\n1,x\r\n2,\"y, z\"\r\n");
    /// ```
    pub fn build_csv(&self, model: &ModelMeta, objects: &[Record]) -> ViewResult<String> {
        let fields = model.field_names();
        let mut out = String::new();
        write_row(&mut out, fields.iter().map(|name| Cow::Borrowed(*name)));
        for object in objects {
            let mut row = Vec::with_capacity(fields.len());
            for name in &fields {
                row.push(Cow::Owned(object.attr(model, name)?.to_text()));
            }
            write_row(&mut out, row.into_iter());
        }
        Ok(out)
    }

    fn export(&self, model: &ModelMeta, objects: &[Record]) -> ViewResult<HttpResponse> {
        let body = self.build_csv(model, objects)?;
        let disposition = format!("attachment; filename={}.csv", model.object_name());
        let disposition = HeaderValue::from_str(&disposition)
            .map_err(|e| ViewError::Configuration(format!("invalid export filename: {e}")))?;
        let mut response = HttpResponse::ok(body).set_header(CONTENT_DISPOSITION, disposition);
        response.set_content_type("text/csv");
        Ok(response)
    }
}

fn write_row<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote(&field));
    }
    out.push_str("\r\n");
}

/// Quotes a field if it contains a delimiter, quote, or line break.
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[async_trait]
impl ViewMixin for CsvExport {
    fn name(&self) -> &'static str {
        "CsvExport"
    }

    async fn render_to_response(
        &self,
        request: &HttpRequest,
        model: &ModelMeta,
        objects: &[Record],
        _context: &Context,
    ) -> ViewResult<Option<HttpResponse>> {
        if !self.is_requested(request) {
            return Ok(None);
        }
        tracing::debug!(model = model.model_name(), rows = objects.len(), "exporting csv");
        self.export(model, objects).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewkit_db::{FieldDef, FieldType};

    fn item_meta() -> ModelMeta {
        ModelMeta::new("Item")
            .field(FieldDef::new("id", FieldType::AutoField).primary_key())
            .field(FieldDef::new("name", FieldType::CharField).nullable())
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_null_is_empty() {
        let objects = vec![Record::new().with("id", 1_i64).with("name", None::<String>)];
        let csv = CsvExport::new().build_csv(&item_meta(), &objects).unwrap();
        assert_eq!(csv, "id,name\r\n1,\r\n");
    }

    #[test]
    fn test_missing_attribute_fails() {
        let objects = vec![Record::new().with("id", 1_i64)];
        let err = CsvExport::new().build_csv(&item_meta(), &objects).unwrap_err();
        assert!(matches!(err, ViewError::MissingAttribute { .. }));
    }

    #[test]
    fn test_empty_result_has_header() {
        let csv = CsvExport::new().build_csv(&item_meta(), &[]).unwrap();
        assert_eq!(csv, "id,name\r\n");
    }

    #[tokio::test]
    async fn test_not_requested_delegates() {
        let request = HttpRequest::builder().query_string("export=pdf").build();
        let response = CsvExport::new()
            .render_to_response(&request, &item_meta(), &[], &Context::new())
            .await
            .unwrap();
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_response_headers() {
        let request = HttpRequest::builder().query_string("export=csv").build();
        let objects = vec![Record::new().with("id", 1_i64).with("name", "x")];
        let response = CsvExport::new()
            .render_to_response(&request, &item_meta(), &objects, &Context::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.content_type(), "text/csv");
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=Item.csv"
        );
        assert_eq!(response.text(), "id,name\r\n1,x\r\n");
    }

    #[test]
    fn test_configured_trigger() {
        let settings = Settings {
            export_param: "format".into(),
            export_csv_value: "spreadsheet".into(),
            ..Settings::default()
        };
        let stage = CsvExport::from_settings(&settings);
        assert!(stage.is_requested(&HttpRequest::builder().query_string("format=spreadsheet").build()));
        assert!(!stage.is_requested(&HttpRequest::builder().query_string("export=csv").build()));
    }
}

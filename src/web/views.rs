use askama::Template;
use askama_web::WebTemplate;

use crate::history::RunRecord;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) csrf_token: String,
    pub(crate) has_flash: bool,
    pub(crate) flash_message: String,
    pub(crate) flash_class: String,
    pub(crate) has_history: bool,
    pub(crate) records: Vec<RunRecord>,
}

#[derive(Template, WebTemplate)]
#[template(path = "result.html")]
pub(crate) struct ResultTemplate {
    pub(crate) filename: String,
    pub(crate) image_data_uri: String,
    pub(crate) content_type_label: String,
    pub(crate) description: String,
    pub(crate) generated_text: String,
}

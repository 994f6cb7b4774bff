use askama::Template;
use askama_web::WebTemplate;

/// The drawing page
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) generate_path: &'static str,
}

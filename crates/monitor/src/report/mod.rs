pub(crate) mod escape;
pub(crate) mod html;
pub(crate) mod plain;
pub(crate) mod view;

pub(crate) use html::render_html;
pub(crate) use plain::render_plain;
pub(crate) use view::ReportView;

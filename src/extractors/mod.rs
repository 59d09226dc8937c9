pub mod docx;
pub mod xml;

pub use docx::extract_docx;
pub use xml::extract_xml;

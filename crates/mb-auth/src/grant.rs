/// A freshly issued pair of signed tokens.
#[derive(Debug, Clone)]
pub struct Grant {
    pub access: String,
    pub refresh: String,
}

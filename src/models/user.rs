/// Identity of the caller, taken from a verified token and stored in request
/// extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
}

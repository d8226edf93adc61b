pub(crate) mod extract;
pub(crate) mod posts;
pub(crate) mod router;
pub(crate) mod users;

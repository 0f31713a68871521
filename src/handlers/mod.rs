// Public handlers: token issuance, no authentication
pub mod public;

// Protected handlers: everything under /api that needs a bearer token
pub mod protected;

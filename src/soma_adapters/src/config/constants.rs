pub mod env {
    pub const ENVIRONMENT_ENV_VAR: &str = "SOMA_ENVIRONMENT";
}

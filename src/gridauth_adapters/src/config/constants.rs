pub mod env {
    pub const JWT_SECRET_ENV_VAR: &str = "GRIDAUTH__JWT__SECRET";
    pub const DATABASE_URL_ENV_VAR: &str = "GRIDAUTH__POSTGRES__URL";
    pub const POSTMARK_AUTH_TOKEN_ENV_VAR: &str = "GRIDAUTH__EMAIL_CLIENT__AUTH_TOKEN";
    pub const RESET_BASE_URL_ENV_VAR: &str = "GRIDAUTH__RESET__BASE_URL";
}

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";

    pub mod email_client {
        use std::time::Duration;

        pub const BASE_URL: &str = "https://api.postmarkapp.com/";
        pub const SENDER: &str = "no-reply@gridauth.io";
        pub const TIMEOUT: Duration = Duration::from_secs(10);
    }
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";

    pub mod email_client {
        use std::time::Duration;

        pub const SENDER: &str = "test@email.com";
        pub const TIMEOUT: Duration = Duration::from_millis(200);
    }
}

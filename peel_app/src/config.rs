///
/// Configuration for the application
///
#[derive(clap::Parser)]
pub struct Config {
    #[arg(long, env)]
    pub database_url: String,

    #[arg(long, env)]
    pub jwt_signing_key: JwtSigningKey,
}

#[derive(Clone)]
pub struct JwtSigningKey(pub hmac::Hmac<sha2::Sha384>);

impl std::str::FromStr for JwtSigningKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use hmac::Mac;

        match hmac::Hmac::new_from_slice(s.as_bytes()) {
            Ok(hmac) => Ok(Self(hmac)),
            Err(error) => Err(format!("Failed to parse HMAC: {error:?}")),
        }
    }
}

use entrait::entrait;

pub mod access;
pub mod error;
pub mod iter_util;
pub mod timestamp;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserId(pub uuid::Uuid);

#[derive(Clone)]
pub struct PasswordHash(pub String);

///
/// Mockable system abstraction
///
#[entrait(mock_api = SystemMock)]
pub trait System {
    fn get_current_time(&self) -> time::OffsetDateTime;
}

///
/// Mockable config accessor
///
#[entrait(mock_api = GetConfigMock)]
pub trait GetConfig {
    fn get_jwt_signing_key(&self) -> &hmac::Hmac<sha2::Sha384>;
}

/// Canned clauses for tests in downstream crates.
pub mod test {
    use super::*;

    use hmac::Mac;
    use unimock::*;

    pub fn mock_system_and_config() -> impl Clause {
        (
            SystemMock::get_current_time
                .each_call(matching!())
                .returns(time::OffsetDateTime::from_unix_timestamp(0).unwrap()),
            GetConfigMock::get_jwt_signing_key
                .each_call(matching!())
                .returns(
                    hmac::Hmac::<sha2::Sha384>::new_from_slice("foobar".as_bytes())
                        .expect("HMAC-SHA-384 can accept any key length"),
                ),
        )
    }
}

//! Data models for the circulation server

/// Declares a status-like enum stored as TEXT and serialized as its lowercase name.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {} value: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = sqlx::Decode::<sqlx::Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

pub mod admin;
pub mod book;
pub mod dashboard;
pub mod fine;
pub mod identity;
pub mod loan;
pub mod notification;
pub mod patron;
pub mod reservation;

// Re-export commonly used types
pub use admin::{Admin, AdminRole};
pub use book::{Book, BookCondition, BookDetails};
pub use fine::{Fine, FineReason, FineStatus};
pub use identity::{Claims, Scope};
pub use loan::{Loan, LoanStatus};
pub use notification::{NewNotification, Notification, NotificationType};
pub use patron::{Patron, PatronStatus, PatronType};
pub use reservation::{Reservation, ReservationStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_enum_round_trip_through_strings() {
        assert_eq!(LoanStatus::Borrowed.as_str(), "borrowed");
        assert_eq!("RETURNED".parse::<LoanStatus>().unwrap(), LoanStatus::Returned);
        assert_eq!(AdminRole::SuperAdmin.to_string(), "super_admin");
        assert!("archived".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_text_enum_serializes_lowercase() {
        let json = serde_json::to_string(&PatronStatus::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");

        let parsed: FineStatus = serde_json::from_str("\"waived\"").unwrap();
        assert_eq!(parsed, FineStatus::Waived);
    }
}

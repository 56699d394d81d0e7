//! Newtype IDs for iiko (POS) entity references.
//!
//! iiko identifies everything with UUID strings. Nomenclature payloads are
//! passed through as-is, so these wrappers accept any string via `new()`;
//! identifiers coming from request parameters go through [`parse`] which
//! requires a well-formed UUID.
//!
//! [`parse`]: OrganizationId::parse

/// Error returned when a POS identifier is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosIdError {
    /// The input string is empty.
    #[error("identifier cannot be empty")]
    Empty,
    /// The input string is not a UUID.
    #[error("identifier is not a valid UUID: {0}")]
    Malformed(String),
}

/// Macro to define a type-safe POS ID wrapper around `String`.
#[macro_export]
macro_rules! define_pos_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier without validation.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Parse an identifier that must be a UUID.
            ///
            /// Surrounding whitespace is ignored and the stored value is the
            /// lowercase hyphenated form.
            ///
            /// # Errors
            ///
            /// Returns `PosIdError` if the input is empty or not a UUID.
            pub fn parse(raw: &str) -> ::core::result::Result<Self, $crate::PosIdError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($crate::PosIdError::Empty);
                }
                ::uuid::Uuid::parse_str(trimmed)
                    .map(|uuid| Self(uuid.hyphenated().to_string()))
                    .map_err(|_| $crate::PosIdError::Malformed(trimmed.to_owned()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Consumes the wrapper and returns the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_pos_id!(OrganizationId);
define_pos_id!(TerminalGroupId);
define_pos_id!(GroupId);
define_pos_id!(PosProductId);
define_pos_id!(SizeId);
define_pos_id!(ModifierId);
define_pos_id!(CityId);
define_pos_id!(StreetId);
define_pos_id!(PosOrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_uuid() {
        let id = OrganizationId::parse(" 7B9D5C1E-0F4A-4C43-9E25-3A3C1A2B4D5E ");
        assert_eq!(
            id.map(OrganizationId::into_inner),
            Ok("7b9d5c1e-0f4a-4c43-9e25-3a3c1a2b4d5e".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert_eq!(CityId::parse("   "), Err(PosIdError::Empty));
        assert!(matches!(
            StreetId::parse("not-a-uuid"),
            Err(PosIdError::Malformed(_))
        ));
    }

    #[test]
    fn test_new_does_not_validate() {
        let group = GroupId::new("G1");
        assert_eq!(group.as_str(), "G1");
        assert!(!group.is_empty());
        assert!(GroupId::new("").is_empty());
    }
}

//! Core types for the reconciliation engine.
//!
//! - [`RelationKind`]: A membership relation family and its static
//!   [`KindDescriptor`]
//! - [`MemberType`]: The member types a relation dimension can hold
//! - [`RelationDeclaration`]: The fields the configuration layer declares
//! - [`RelationMode`]: The resolved shape of an instance
//! - [`RelationId`]: The durable `parent/tag/discriminator` identifier

mod declaration;
mod identifier;
mod kind;
mod member;

pub use declaration::{RelationDeclaration, RelationMode};
pub use identifier::{RelationId, decode_name, encode_name};
pub use kind::{Dimension, KindDescriptor, ObjectType, RelationKind};
pub use member::{ALREADY_MEMBER, CaseSensitivity, FailedMember, MemberType, NOT_MEMBER};

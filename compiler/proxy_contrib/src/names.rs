//! Reserved member names and persisted-state keys.
//!
//! Field names and payload keys are part of the persisted-state format read
//! by the external reconstruction path. Changing any of them breaks
//! previously serialized proxies.

/// `Interceptor[]` attached at construction time.
pub const INTERCEPTORS_FIELD: &str = "__interceptors";
/// Wrapped instance of a field-backed proxy.
pub const TARGET_FIELD: &str = "__target";
/// Static slot holding the options the type was generated with.
pub const GENERATION_OPTIONS_FIELD: &str = "__generationOptions";

pub const GET_PROXY_TARGET: &str = "get_proxy_target";
pub const SET_PROXY_TARGET: &str = "set_proxy_target";
pub const GET_INTERCEPTORS: &str = "get_interceptors";

/// Message of the failure raised by `set_proxy_target` on proxies that are
/// their own target.
pub const IMMUTABLE_TARGET_MESSAGE: &str =
    "Cannot change the target of a proxy whose target is not separately stored.";

/// Keys of the serialization payload.
pub mod keys {
    pub const INTERFACES: &str = "__interfaces";
    pub const BASE_TYPE: &str = "__baseType";
    pub const PROXY_GENERATION_OPTIONS: &str = "__proxyGenerationOptions";
    pub const PROXY_TYPE_ID: &str = "__proxyTypeId";
    pub const THE_INTERFACE: &str = "__theInterface";
    pub const DELEGATE_TO_BASE: &str = "__delegateToBase";
    pub const TARGET_FIELD_TYPE: &str = "__targetFieldType";
}

//! Built-in natives
//!
//! The default table of host callables exposed to scripts. Each native
//! receives one value and returns one value; the dispatcher routes their
//! errors through the regular raise machinery.

pub mod convert;
pub mod encoding;
pub mod io;
pub mod random;
pub mod reflect;
pub mod registry;
pub mod time;

pub use registry::{NativeFn, NativeRegistry};

/// Build the default native table.
pub fn default_registry() -> NativeRegistry {
    let mut registry = NativeRegistry::new();

    registry.register("print", io::print);
    registry.register("exit", io::exit);

    registry.register("typeof", convert::type_of);
    registry.register("len", convert::len);
    registry.register("str", convert::to_str);
    registry.register("int", convert::to_int);
    registry.register("float", convert::to_float);
    registry.register("range", convert::range);
    registry.register("doc", convert::doc);

    registry.register("json_encode", encoding::json_encode);
    registry.register("json_decode", encoding::json_decode);
    registry.register("base64_encode", encoding::base64_encode);
    registry.register("base64_decode", encoding::base64_decode);

    registry.register("time", time::time);
    registry.register("date", time::date);
    registry.register("random", random::random);

    registry.register("eval", reflect::eval);
    registry.register("import", reflect::import);

    registry
}

//! Entry point of the worker wasm module

#[cfg(target_arch = "wasm32")]
fn main() {
    web::start_worker();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {}

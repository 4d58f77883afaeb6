/// Render the package name and version of the calling crate.
#[macro_export]
macro_rules! build_info {
    () => {
        concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
    };
}

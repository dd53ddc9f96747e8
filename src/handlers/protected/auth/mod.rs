mod whoami;

pub use whoami::whoami;

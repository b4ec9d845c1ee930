pub mod config;
pub mod connection;
pub mod console;
pub mod exception;
pub mod param;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod shutdown;

pub use config::Config;
pub use exception::Exception;
pub use param::HttpRequestMethod;
pub use request::{Request, RequestLine, Target};
pub use response::Response;
pub use router::{Resolution, Route, Router};
pub use server::{ActiveConnections, Server};
pub use shutdown::ShutdownHandle;

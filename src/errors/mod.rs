mod mcp_error;
mod tool_error;
mod upstream_error;

pub use mcp_error::{ErrorCode, McpError};
pub use tool_error::{ToolError, ToolErrorKind};
pub use upstream_error::{UpstreamError, UpstreamResult};

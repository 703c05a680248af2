use json::JsonValue;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use tracing::{info, info_span, Span};

/// Per-request logging context. Messages logged through it carry the client,
/// request id and method; dropping it logs how long the call took.
pub struct CallContext {
    client_ip: String,
    request_id: JsonValue,
    rpc_function: String,
    start_time: Instant,
    span: Span,
}

impl Default for CallContext {
    fn default() -> CallContext {
        CallContext {
            client_ip: String::new(),
            request_id: JsonValue::Null,
            rpc_function: String::new(),
            start_time: Instant::now(),
            span: Span::none(),
        }
    }
}

impl CallContext {
    pub fn new(client_ip: &str, request_id: &JsonValue, rpc_function: &str) -> Self {
        let span = info_span!(
            "rpc",
            client = client_ip,
            id = %request_id,
            method = rpc_function
        );
        let context = CallContext {
            client_ip: client_ip.to_string(),
            request_id: request_id.clone(),
            rpc_function: rpc_function.to_string(),
            start_time: Instant::now(),
            span,
        };
        context.span.in_scope(|| info!("->"));
        context
    }

    pub fn rpc_function(&self) -> &str {
        &self.rpc_function
    }

    pub fn log_message(&self, message: &str) {
        self.span.in_scope(|| info!("{message}"));
    }

    fn is_anonymous(&self) -> bool {
        self.client_ip.is_empty() && self.request_id.is_null() && self.rpc_function.is_empty()
    }
}

impl Drop for CallContext {
    fn drop(&mut self) {
        if self.is_anonymous() {
            return;
        }
        let took_ms = self.start_time.elapsed().as_millis() as u64;
        self.span.in_scope(|| info!(took_ms, "<-"));
    }
}

impl Display for CallContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}]", self.client_ip, self.request_id)
    }
}

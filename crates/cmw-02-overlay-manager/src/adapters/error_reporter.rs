//! Manager failures published on the error channel.

use crate::error::TreeError;
use crate::ports::ErrorReporter;
use cmw_01_channels::ErrorChannel;
use serde_json::json;

impl ErrorReporter for ErrorChannel {
    fn report(&self, sender: &str, error_type: &str, error: &TreeError) {
        let msg = error.to_string();
        self.send_error(
            sender,
            error_type,
            &msg,
            json!({ "type": error.kind(), "msg": msg }),
        );
    }
}

//! JSON bodies returned to callers.
//!
//! Success:
//!
//! ```json
//! {"data":{"type":"mu-docker-compose-handler",
//!          "attributes":{"status":200,"message":"DockerCompose created and Stack updated"}}}
//! ```
//!
//! Failure: `{"status":500,"title":"…","detail":"…"}`.

use serde::{Deserialize, Serialize};

/// `data.type` of every success envelope.
pub const RESOURCE_TYPE: &str = "mu-docker-compose-handler";

pub const LINKED_MESSAGE: &str = "DockerCompose created and Stack updated";

/// Plain-text acknowledgement for notifications that insert no stack.
pub const NO_STACK_INSERTED: &str = "no stack inserted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
  pub data: SuccessData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessData {
  #[serde(rename = "type")]
  pub kind:       String,
  pub attributes: SuccessAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessAttributes {
  pub status:  u16,
  pub message: String,
}

impl SuccessEnvelope {
  /// A manifest was created and the stack now points at it.
  pub fn linked() -> Self {
    Self {
      data: SuccessData {
        kind:       RESOURCE_TYPE.to_owned(),
        attributes: SuccessAttributes {
          status:  200,
          message: LINKED_MESSAGE.to_owned(),
        },
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
  pub status: u16,
  pub title:  String,
  pub detail: String,
}

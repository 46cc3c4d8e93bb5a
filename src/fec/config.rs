// Copyright (c) 2024, The QuicFuscate Project Authors.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following disclaimer
//       in the documentation and/or other materials provided with the
//       distribution.
//
//     * Neither the name of the copyright holder nor the names of its
//       contributors may be used to endorse or promote products derived from
//       this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Sizing configuration: describes the build-time `const` generics a
//! decoder was instantiated with, so two peers can validate agreement
//! before trusting the wire format. The decoder's own arrays stay
//! fixed-size `const` generics; this struct exists purely to catch a
//! peer-configuration mismatch at startup.

use crate::error::ConfigError;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct SizingConfig {
    pub header_bytes: usize,
    pub payload_max: usize,
    pub max_coded_packet: usize,
    pub max_coef_pos: usize,
}

impl SizingConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Checks that `self` matches the `const` generics a
    /// `PacketSet<C, H, P, CB>` was instantiated with (`CB` is the
    /// decoded-bitmap byte count, i.e. `max_coef_pos / 8`).
    pub fn validate_against(&self, header_bytes: usize, payload_max: usize, max_coded_packet: usize, coef_pos_bytes: usize) -> Result<(), ConfigError> {
        if self.header_bytes != header_bytes {
            return Err(ConfigError::Mismatch(format!(
                "header_bytes mismatch: config={} build={}",
                self.header_bytes, header_bytes
            )));
        }
        if self.payload_max != payload_max {
            return Err(ConfigError::Mismatch(format!(
                "payload_max mismatch: config={} build={}",
                self.payload_max, payload_max
            )));
        }
        if self.max_coded_packet != max_coded_packet {
            return Err(ConfigError::Mismatch(format!(
                "max_coded_packet mismatch: config={} build={}",
                self.max_coded_packet, max_coded_packet
            )));
        }
        if self.max_coef_pos != coef_pos_bytes * 8 {
            return Err(ConfigError::Mismatch(format!(
                "max_coef_pos mismatch: config={} build={}",
                self.max_coef_pos,
                coef_pos_bytes * 8
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_validate() {
        let cfg = SizingConfig::from_toml(
            r#"
            header_bytes = 16
            payload_max = 128
            max_coded_packet = 4
            max_coef_pos = 8192
            "#,
        )
        .unwrap();
        assert!(cfg.validate_against(16, 128, 4, 1024).is_ok());
        assert!(cfg.validate_against(8, 128, 4, 1024).is_err());
    }
}

//! Bit-count decoder invocation.
//!
//! The HM reference decoder, built with bit statistics enabled, prints one
//! line per syntax element (and per coding-unit size) when given `-b`.

use crate::config::HarnessConfig;
use crate::external::runner::ToolCommand;

/// Builds `<decoder> -b <bitstream>`, run inside the working directory.
pub fn build_decoder_command(config: &HarnessConfig) -> ToolCommand {
    ToolCommand::new(&config.tools.decoder)
        .current_dir(&config.work_dir)
        .args(["-b", config.artifacts.bitstream.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfigBuilder;
    use std::path::Path;

    #[test]
    fn passes_bitstream_after_flag() {
        let config = HarnessConfigBuilder::new()
            .decoder("../bin/TAppDecoder")
            .work_dir("/data")
            .build();
        let cmd = build_decoder_command(&config);

        assert_eq!(cmd.program(), Path::new("../bin/TAppDecoder"));
        assert_eq!(cmd.get_args(), ["-b", "recoded.h265"]);
        assert_eq!(cmd.working_dir(), Some(Path::new("/data")));
    }
}

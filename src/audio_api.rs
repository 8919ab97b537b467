use crate::error::Result;

// Everything the playback core is allowed to ask of the sound card. The
// engine on the audio thread turns these into an actual waveform.
#[derive(Clone, Debug, PartialEq)]
pub enum AudioCommand {
    // Start the envelope (attack) at this pitch
    OpenTone { freq_hz: f32 },

    // Glide the running oscillator to a new pitch, no re-attack
    RampTone { freq_hz: f32, ramp_ms: f32 },

    // Release the envelope
    CloseTone,

    // Output gain in decibels, -60..=0
    SetGain { db: f32 },
}

/// The audio-device boundary. The envelope controller drives it; nothing in
/// here decides *when* a tone opens or closes.
pub trait AudioDevice {
    /// Acquire the platform audio output. Must be idempotent: once it has
    /// succeeded, further calls do nothing. A failure leaves the device
    /// uninitialized so the next explicit call can try again.
    fn init(&mut self) -> Result<()>;

    fn is_ready(&self) -> bool;

    fn send(&mut self, cmd: AudioCommand);

    fn open_tone(&mut self, freq_hz: f32) {
        self.send(AudioCommand::OpenTone { freq_hz });
    }

    fn ramp_tone(&mut self, freq_hz: f32, ramp_ms: f32) {
        self.send(AudioCommand::RampTone { freq_hz, ramp_ms });
    }

    fn close_tone(&mut self) {
        self.send(AudioCommand::CloseTone);
    }

    fn set_gain(&mut self, db: f32) {
        self.send(AudioCommand::SetGain { db });
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::error::SonifyError;

    // Stand-in sound card: remembers every command in order
    #[derive(Debug, Default)]
    pub struct RecordingDevice {
        pub log: Vec<AudioCommand>,
        pub init_calls: usize,
        pub fail_init: bool,
        ready: bool,
    }

    impl RecordingDevice {
        pub fn failing() -> Self {
            Self { fail_init: true, ..Self::default() }
        }

        pub fn attacks(&self) -> usize {
            self.log.iter().filter(|c| matches!(c, AudioCommand::OpenTone { .. })).count()
        }

        pub fn releases(&self) -> usize {
            self.log.iter().filter(|c| matches!(c, AudioCommand::CloseTone)).count()
        }

        pub fn ramp_freqs(&self) -> Vec<f32> {
            self.log
                .iter()
                .filter_map(|c| match c {
                    AudioCommand::RampTone { freq_hz, .. } => Some(*freq_hz),
                    _ => None,
                })
                .collect()
        }
    }

    impl AudioDevice for RecordingDevice {
        fn init(&mut self) -> Result<()> {
            self.init_calls += 1;
            if self.ready {
                return Ok(());
            }
            if self.fail_init {
                return Err(SonifyError::AudioInit("no output device".into()));
            }
            self.ready = true;
            Ok(())
        }

        fn is_ready(&self) -> bool {
            self.ready
        }

        fn send(&mut self, cmd: AudioCommand) {
            self.log.push(cmd);
        }
    }
}

pub mod mailbox;
pub mod wav_format;

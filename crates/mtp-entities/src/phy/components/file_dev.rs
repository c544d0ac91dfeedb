use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};

use crate::phy::components::bit_dev::{BitDev, BitDevError, IDLE_OCTET};

#[derive(Debug, Clone)]
pub enum FileWriteMsg {
    WriteBlock(Vec<u8>),
    Shutdown,
}

/// Replays received line octets from a file and records transmitted ones to another.
/// Without an input file the line is idle; without an output file sent octets are dropped.
pub struct FileDev {
    reader: Option<File>,
    eof: bool,
    writer: Option<Sender<FileWriteMsg>>,
    writer_thread: Option<JoinHandle<()>>,
    rx_octets: u64,
}

impl FileDev {
    pub fn new<P: AsRef<Path>>(rx_file: Option<P>, tx_file: Option<P>) -> io::Result<Self> {
        let reader = match rx_file {
            Some(path) => Some(OpenOptions::new().read(true).open(path)?),
            None => None,
        };
        let (writer, writer_thread) = match tx_file {
            Some(path) => {
                let (sender, handle) = Self::create_async_writer(path, "tx-file-writer".to_string())?;
                (Some(sender), Some(handle))
            }
            None => (None, None),
        };
        Ok(Self { reader, eof: false, writer, writer_thread, rx_octets: 0 })
    }

    /// Octets read from the input file so far
    pub fn rx_octets(&self) -> u64 {
        self.rx_octets
    }

    /// Spawns a thread writing blocks to `filename` so the stack never waits on the disk
    fn create_async_writer<P: AsRef<Path>>(filename: P, thread_name: String) -> io::Result<(Sender<FileWriteMsg>, JoinHandle<()>)> {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(filename.as_ref())?;
        let (sender, receiver) = unbounded::<FileWriteMsg>();

        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let mut out = BufWriter::new(file);
                while let Ok(msg) = receiver.recv() {
                    match msg {
                        FileWriteMsg::WriteBlock(data) => {
                            if let Err(e) = out.write_all(&data) {
                                tracing::error!("writing output file: {}", e);
                                break;
                            }
                        }
                        FileWriteMsg::Shutdown => break,
                    }
                }
                if let Err(e) = out.flush() {
                    tracing::error!("flushing output file: {}", e);
                }
            })?;

        Ok((sender, handle))
    }

    /// Fills `buffer` from the input file. A partial block at the end is padded with flags.
    fn read_block(&mut self, buffer: &mut [u8]) -> Result<(), BitDevError> {
        let Some(reader) = self.reader.as_mut() else {
            buffer.fill(IDLE_OCTET);
            return Ok(());
        };
        if self.eof {
            return Err(BitDevError::RxEndOfData);
        }

        let mut bytes_read = 0;
        while bytes_read < buffer.len() {
            match reader.read(&mut buffer[bytes_read..]) {
                Ok(0) => {
                    self.eof = true;
                    if bytes_read == 0 {
                        return Err(BitDevError::RxEndOfData);
                    }
                    tracing::debug!("padding final block of {} octets", bytes_read);
                    buffer[bytes_read..].fill(IDLE_OCTET);
                    break;
                }
                Ok(n) => bytes_read += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!("reading input file: {}", e);
                    return Err(BitDevError::RxReadError);
                }
            }
        }
        self.rx_octets += bytes_read as u64;
        Ok(())
    }
}

impl BitDev for FileDev {
    fn rxtx_block(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), BitDevError> {
        if let Some(writer) = &self.writer {
            writer.send(FileWriteMsg::WriteBlock(tx.to_vec())).map_err(|_| BitDevError::TxWriteError)?;
        }
        self.read_block(rx)
    }
}

impl Drop for FileDev {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            let _ = writer.send(FileWriteMsg::Shutdown);
        }
        if let Some(handle) = self.writer_thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::path::PathBuf;

    use mtp_core::debug;

    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!(
            "file_dev_{}_{}.bin",
            tag,
            std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap().as_nanos()
        ));
        path
    }

    fn create_temp_file(tag: &str, data: &[u8]) -> PathBuf {
        let path = temp_path(tag);
        let mut file = File::create(&path).unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        path
    }

    #[test]
    fn test_read_until_end() {
        debug::setup_logging_verbose();
        let path = create_temp_file("read", &[1, 2, 3, 4, 5, 6]);
        let mut dev = FileDev::new(Some(&path), None).unwrap();
        let mut rx = [0u8; 4];

        assert!(dev.rxtx_block(&[0; 4], &mut rx).is_ok());
        assert_eq!(rx, [1, 2, 3, 4]);

        // Final partial block is padded with flags
        assert!(dev.rxtx_block(&[0; 4], &mut rx).is_ok());
        assert_eq!(rx, [5, 6, IDLE_OCTET, IDLE_OCTET]);

        assert_eq!(dev.rxtx_block(&[0; 4], &mut rx), Err(BitDevError::RxEndOfData));
        assert_eq!(dev.rx_octets(), 6);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_write_blocks() {
        debug::setup_logging_verbose();
        let path = temp_path("write");
        {
            let mut dev = FileDev::new(None, Some(&path)).unwrap();
            let mut rx = [0u8; 2];
            dev.rxtx_block(&[0xaa, 0xbb], &mut rx).unwrap();
            assert_eq!(rx, [IDLE_OCTET; 2]);
            dev.rxtx_block(&[0xcc, 0xdd], &mut rx).unwrap();
        }
        // Dropping the device flushes the writer thread
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xaa, 0xbb, 0xcc, 0xdd]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_input_file() {
        debug::setup_logging_verbose();
        let path = temp_path("missing");
        assert!(FileDev::new(Some(&path), None).is_err());
    }
}

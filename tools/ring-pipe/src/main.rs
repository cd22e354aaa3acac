use std::io::{self, BufRead, Read, Write};

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use ring_buf::{Error, ItemRing, RingBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    /// Copy everything, reading straight into claimed spans.
    Fifo,
    /// Keep only the last `capacity` bytes, dropping the oldest.
    Tail,
    /// Frame each line as a length-prefixed item.
    Lines,
}

#[derive(Parser, Debug)]
#[command(about = "Streams stdin to stdout through a fixed-size ring buffer")]
struct Params {
    /// Ring capacity in bytes.
    #[clap(short, long, default_value_t = 4096)]
    capacity: usize,

    /// Largest single read from stdin in `fifo` mode.
    #[clap(long, default_value_t = 512)]
    chunk: usize,

    #[clap(short, long, value_enum, default_value_t = Mode::Fifo)]
    mode: Mode,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let params = Params::parse();
    info!(?params, "starting");

    if params.capacity == 0 {
        bail!("capacity must be at least one byte");
    }

    let storage = vec![0u8; params.capacity];
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    match params.mode {
        Mode::Fifo => fifo(RingBuf::new(storage), params.chunk.max(1), stdin, &mut stdout)?,
        Mode::Tail => tail(RingBuf::new(storage), stdin, &mut stdout)?,
        Mode::Lines => lines(ItemRing::new(storage), stdin, &mut stdout)?,
    }

    stdout.flush().context("flushing stdout")?;
    Ok(())
}

/// Writes out and acknowledges everything buffered.
fn drain(ring: &mut RingBuf<Vec<u8>>, out: &mut impl Write) -> anyhow::Result<usize> {
    let mut written = 0;

    loop {
        let span = ring.get_claim(usize::MAX);
        if span.is_empty() {
            return Ok(written);
        }

        let len = span.len();
        out.write_all(span).context("writing to stdout")?;
        ring.get_ack(len)?;
        written += len;
    }
}

fn fifo(
    mut ring: RingBuf<Vec<u8>>,
    chunk: usize,
    mut input: impl Read,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut total = 0;

    loop {
        let span = ring.put_claim(chunk);
        if span.is_empty() {
            total += drain(&mut ring, out)?;
            continue;
        }

        let read = input.read(span).context("reading stdin")?;
        ring.put_ack(read)?;
        debug!(read, used = ring.used_space(), "read");

        if read == 0 {
            total += drain(&mut ring, out)?;
            info!(total, "done");
            return Ok(());
        }

        if ring.free_space() < chunk {
            total += drain(&mut ring, out)?;
        }
    }
}

fn tail(mut ring: RingBuf<Vec<u8>>, input: impl Read, out: &mut impl Write) -> anyhow::Result<()> {
    let mut seen = 0usize;

    for byte in input.bytes() {
        let byte = byte.context("reading stdin")?;
        ring.put_circ(&[byte])?;
        seen += 1;
    }

    let kept = drain(&mut ring, out)?;
    info!(seen, kept, "done");
    Ok(())
}

fn lines(
    mut items: ItemRing<Vec<u8>>,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut item_out = vec![0u8; items.capacity()];
    let mut line = Vec::new();
    let mut count = 0usize;

    let mut flush = |items: &mut ItemRing<Vec<u8>>, out: &mut dyn Write| -> anyhow::Result<()> {
        while !items.is_empty() {
            let len = items.get(&mut item_out)?;
            out.write_all(&item_out[..len]).context("writing to stdout")?;
        }
        Ok(())
    };

    // lines are raw bytes and keep their terminator
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line).context("reading stdin")? == 0 {
            break;
        }

        match items.put(&line) {
            Ok(()) => {}
            Err(Error::MessageTooLarge { .. }) if !items.is_empty() => {
                flush(&mut items, out)?;
                items.put(&line).context("line does not fit in the ring")?;
            }
            Err(err) => return Err(err).context("line does not fit in the ring"),
        }
        count += 1;
    }

    flush(&mut items, out)?;
    info!(count, "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| u8::try_from(i % 251).unwrap()).collect()
    }

    fn run_lines(capacity: usize, input: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut out = Vec::new();
        lines(
            ItemRing::new(vec![0u8; capacity]),
            Cursor::new(input),
            &mut out,
        )?;
        Ok(out)
    }

    #[test]
    fn test_fifo_capacity_smaller_than_chunk() {
        let input = pattern(1000);
        let mut out = Vec::new();

        fifo(RingBuf::new(vec![0u8; 7]), 16, Cursor::new(&input), &mut out).unwrap();

        assert_eq!(out, input);
    }

    #[test]
    fn test_fifo_wraps_storage() {
        let input = pattern(257);
        let mut out = Vec::new();

        fifo(RingBuf::new(vec![0u8; 10]), 3, Cursor::new(&input), &mut out).unwrap();

        assert_eq!(out, input);
    }

    #[test]
    fn test_fifo_empty_input() {
        let mut out = Vec::new();
        fifo(RingBuf::new(vec![0u8; 4]), 4, Cursor::new(b""), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_tail_keeps_last_capacity_bytes() {
        let mut out = Vec::new();
        tail(
            RingBuf::new(vec![0u8; 5]),
            Cursor::new(b"hello, world"),
            &mut out,
        )
        .unwrap();
        assert_eq!(out, b"world");

        let mut out = Vec::new();
        tail(RingBuf::new(vec![0u8; 5]), Cursor::new(b"hey"), &mut out).unwrap();
        assert_eq!(out, b"hey");
    }

    #[test]
    fn test_lines_flush_when_ring_full() {
        // "abc\n" takes 6 of 8 bytes, so the next two lines each force a flush
        let input = b"abc\nde\nf\n\n";
        assert_eq!(run_lines(8, input).unwrap(), input);
    }

    #[test]
    fn test_lines_longer_than_ring() {
        assert!(run_lines(8, b"ok\n0123456789\n").is_err());
    }

    #[test]
    fn test_lines_pass_raw_bytes_through() {
        let inputs: [&[u8]; 4] = [
            b"abc\n\xff\xfe\ndef\n",
            b"a\r\nb\n",
            b"no newline at the end\nx",
            b"",
        ];
        for input in inputs {
            assert_eq!(run_lines(64, input).unwrap(), input);
        }
    }
}

//! Multipage grayscale TIFF stacks, read as T-major volumes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{ArrayD, IxDyn};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

/// An owned grayscale stack at the serialization boundary, one variant per
/// supported bit depth. Pages map to the time axis; the axis labels are
/// always `"TYX"` here.
pub enum Stack {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
}

impl Stack {
    pub const AXES: &'static str = "TYX";

    pub fn num_frames(&self) -> usize {
        match self {
            Stack::U8(v) => v.shape()[0],
            Stack::U16(v) => v.shape()[0],
        }
    }
}

/// Read every page of a multipage grayscale TIFF into a `(T, Y, X)` volume.
///
/// All pages must share one size and bit depth; 8- and 16-bit grayscale are
/// supported, anything else is reported as an error.
pub fn read_stack(path: &Path) -> Result<Stack> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut decoder =
        Decoder::new(BufReader::new(file)).with_context(|| format!("reading {}", path.display()))?;

    let (width, height) = decoder.dimensions()?;
    let mut pages_u8: Vec<u8> = Vec::new();
    let mut pages_u16: Vec<u16> = Vec::new();
    let mut frames = 0usize;

    loop {
        let (w, h) = decoder.dimensions()?;
        if (w, h) != (width, height) {
            bail!(
                "page {} is {}x{}, expected {}x{}",
                frames,
                w,
                h,
                width,
                height
            );
        }
        match decoder.read_image()? {
            DecodingResult::U8(data) => {
                if !pages_u16.is_empty() {
                    bail!("mixed bit depths in {}", path.display());
                }
                pages_u8.extend_from_slice(&data);
            }
            DecodingResult::U16(data) => {
                if !pages_u8.is_empty() {
                    bail!("mixed bit depths in {}", path.display());
                }
                pages_u16.extend_from_slice(&data);
            }
            _ => bail!("unsupported sample format in {}", path.display()),
        }
        frames += 1;
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    let shape = IxDyn(&[frames, height as usize, width as usize]);
    if !pages_u8.is_empty() {
        Ok(Stack::U8(ArrayD::from_shape_vec(shape, pages_u8)?))
    } else {
        Ok(Stack::U16(ArrayD::from_shape_vec(shape, pages_u16)?))
    }
}

/// Write a `(T, Y, X)` volume as a multipage grayscale TIFF of the same bit
/// depth it was read with.
pub fn write_stack(path: &Path, stack: &Stack) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = TiffEncoder::new(file)?;

    match stack {
        Stack::U8(volume) => {
            let (h, w) = (volume.shape()[1] as u32, volume.shape()[2] as u32);
            for page in volume.outer_iter() {
                let data: Vec<u8> = page.iter().copied().collect();
                encoder.write_image::<colortype::Gray8>(w, h, &data)?;
            }
        }
        Stack::U16(volume) => {
            let (h, w) = (volume.shape()[1] as u32, volume.shape()[2] as u32);
            for page in volume.outer_iter() {
                let data: Vec<u16> = page.iter().copied().collect();
                encoder.write_image::<colortype::Gray16>(w, h, &data)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_u16_stack() {
        let dir = std::env::temp_dir();
        let path = dir.join("microstab_io_test_u16.tif");
        let volume = ArrayD::from_shape_fn(IxDyn(&[3, 4, 5]), |ix| {
            (ix[0] * 1000 + ix[1] * 10 + ix[2]) as u16
        });
        write_stack(&path, &Stack::U16(volume.clone())).unwrap();
        let back = read_stack(&path).unwrap();
        match back {
            Stack::U16(v) => assert_eq!(v, volume),
            Stack::U8(_) => panic!("bit depth not preserved"),
        }
        let _ = std::fs::remove_file(&path);
    }
}

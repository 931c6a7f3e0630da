//! Property-based checks for the buffer codecs and tile packing

use proptest::prelude::*;
use rsc_landscape::codec::{
    self, ByteReader, COLOUR_SEED, CellBuffer, HEIGHT_SEED, MAX_CELLS,
};
use rsc_landscape::{CellContent, Sector, SectorCoord};

fn cells(values: impl Strategy<Value = u8>) -> impl Strategy<Value = CellBuffer> {
    proptest::collection::vec(values, MAX_CELLS)
        .prop_map(|cells| CellBuffer::try_from(cells).unwrap_or([0; MAX_CELLS]))
}

/// Buffers with long runs, the shape real terrain has
fn runny_cells() -> impl Strategy<Value = CellBuffer> {
    proptest::collection::vec((0u8..128, 1usize..200), 1..64).prop_map(|runs| {
        let mut buffer = [0u8; MAX_CELLS];
        let mut filled = runs
            .iter()
            .flat_map(|&(value, len)| std::iter::repeat_n(value, len));
        for slot in &mut buffer {
            *slot = filled.next().unwrap_or(0);
        }
        buffer
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repeat_runs_round_trip(buffer in prop_oneof![cells(0u8..128), runny_cells()]) {
        let encoded = codec::encode_repeat_runs(&buffer, "test").unwrap();
        let mut reader = ByteReader::new(&encoded);
        let decoded = codec::decode_repeat_runs(&mut reader, "test").unwrap();
        prop_assert_eq!(decoded, buffer);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn zero_runs_round_trip(buffer in prop_oneof![cells(0u8..128), runny_cells()]) {
        let encoded = codec::encode_zero_runs(&buffer, "test").unwrap();
        let mut reader = ByteReader::new(&encoded);
        let decoded = codec::decode_zero_runs(&mut reader, "test").unwrap();
        prop_assert_eq!(decoded, buffer);
        prop_assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn scramble_round_trip(buffer in cells(any::<u8>())) {
        let even = buffer.map(|value| value & !1);
        for seed in [HEIGHT_SEED, COLOUR_SEED] {
            let mut restored = codec::scramble(&even, seed);
            codec::unscramble(&mut restored, seed);
            prop_assert_eq!(restored, even);
        }
    }

    #[test]
    fn delta_round_trip(buffer in cells(any::<u8>())) {
        prop_assert_eq!(codec::delta_decode(&codec::delta_encode(&buffer)), buffer);
    }

    #[test]
    fn populate_is_idempotent(
        heights in cells(any::<u8>()),
        diagonal in proptest::collection::vec(0i32..60_000, MAX_CELLS),
    ) {
        let mut sector = Sector::new(SectorCoord::new(55, 45, 3).unwrap());
        sector.buffers_mut().terrain_height = heights;
        for (slot, raw) in sector.buffers_mut().walls_diagonal.iter_mut().zip(diagonal) {
            *slot = raw;
        }

        sector.populate_tiles();
        let first = sector.tiles().to_vec();
        let buffers = sector.buffers().clone();

        sector.populate_buffers().unwrap();
        prop_assert_eq!(sector.buffers(), &buffers);
        sector.populate_tiles();
        prop_assert_eq!(sector.tiles(), first.as_slice());
    }

    #[test]
    fn hei_round_trip(heights in cells(any::<u8>()), colours in cells(any::<u8>())) {
        let mut sector = Sector::new(SectorCoord::new(50, 50, 0).unwrap());
        sector.buffers_mut().terrain_height = heights.map(|value| value & !1);
        sector.buffers_mut().terrain_colour = colours.map(|value| value & !1);

        let mut parsed = Sector::new(sector.coord());
        parsed.parse_hei(&sector.to_hei().unwrap()).unwrap();
        prop_assert_eq!(parsed.buffers(), sector.buffers());
    }
}

#[test]
fn band_round_trip_covers_every_value() {
    for raw in 0..49_000 {
        assert_eq!(CellContent::unpack(raw).pack().unwrap(), raw, "raw value {raw}");
    }
}

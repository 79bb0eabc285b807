// End-to-end decoding of synthetic logger buffers
use telemetry_decoder::encoder::{encode_fixed12, encode_fixed8, FrameEncoder, FIXED12_PREAMBLE};
use telemetry_decoder::{
    ChannelDef, ChannelRegistry, Decoder, DecoderConfig, DecoderError, Diagnostic, FramingMode,
    LeadingFill,
};

fn scaled_registry() -> ChannelRegistry {
    ChannelRegistry::from_defs(vec![
        ChannelDef::new(3, "Accel X", 2.0, 0.0),
        ChannelDef::new(4, "Accel Y", 0.5, 1.0),
    ])
    .unwrap()
}

/// Small deterministic generator for stream shapes
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

#[test]
fn test_single_reading_becomes_one_row() {
    let data = [
        0x03, 0x00, 0x00, 0x0A, // channel 3, raw 10
        0xFF, 0xFF, 0xFF, 0x01, // marker, one reading
        0xE8, 0x03, 0x00, 0x00, // 1000 ms
    ];

    let table = Decoder::new(scaled_registry())
        .convert_bytes(&data, &DecoderConfig::new())
        .unwrap();

    assert_eq!(table.channels, vec!["Accel X"]);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].seconds(), 0.0);
    assert_eq!(table.rows[0].values, vec![20.0]);
}

#[test]
fn test_well_formed_streams_never_mismatch() {
    let mut rng = Lcg(7);
    let decoder = Decoder::new(scaled_registry());

    for _ in 0..50 {
        let mut encoder = FrameEncoder::new();
        let groups = rng.next() % 20;
        let mut expected_readings = 0;
        let mut timestamp = rng.next();

        for _ in 0..groups {
            let count = (rng.next() % 6) as usize;
            let readings: Vec<(u8, i32)> = (0..count)
                .map(|_| {
                    let id = (rng.next() % 0xFF) as u8;
                    let raw = (rng.next() & 0xFF_FFFF) as i32 - (1 << 23);
                    (id, raw)
                })
                .collect();
            expected_readings += readings.len();
            encoder.write_group(timestamp, &readings).unwrap();
            timestamp = timestamp.wrapping_add(rng.next() % 1000);
        }

        let log = decoder
            .decode_bytes(encoder.as_bytes(), &DecoderConfig::new())
            .unwrap();
        assert_eq!(log.stats.groups, groups as usize);
        assert_eq!(log.stats.readings, expected_readings);
        assert_eq!(log.stats.bytes_consumed, encoder.as_bytes().len());
        assert!(log
            .diagnostics
            .iter()
            .all(|d| matches!(d, Diagnostic::UnknownChannel { .. })));
    }
}

#[test]
fn test_truncation_keeps_earlier_groups() {
    let mut encoder = FrameEncoder::new();
    encoder.write_group(100, &[(3, 1)]).unwrap();
    encoder.write_group(200, &[(3, 2), (4, 6)]).unwrap();
    let full = encoder.into_bytes();
    let decoder = Decoder::new(scaled_registry());

    // Cut inside the second marker's timestamp
    let cut = &full[..full.len() - 2];
    let log = decoder.decode_bytes(cut, &DecoderConfig::new()).unwrap();

    assert_eq!(log.stats.groups, 1);
    assert_eq!(log.series.get("Accel X").unwrap().points(), vec![(0, 2.0)]);
    assert!(log.series.get("Accel Y").is_none());
    assert_eq!(
        log.diagnostics,
        vec![
            Diagnostic::UnclosedGroup {
                offset: 12,
                readings: 2
            },
            Diagnostic::TruncatedTail {
                offset: 20,
                dropped_bytes: 6
            },
        ]
    );
}

#[test]
fn test_epoch_normalization() {
    let mut encoder = FrameEncoder::new();
    encoder.write_group(5_000_000, &[(3, 1)]).unwrap();
    encoder.write_group(5_000_500, &[(3, 2)]).unwrap();
    let decoder = Decoder::new(scaled_registry());

    let normalized = decoder
        .decode_bytes(encoder.as_bytes(), &DecoderConfig::new())
        .unwrap();
    let timestamps: Vec<u32> = normalized.series.timestamps.iter().copied().collect();
    assert_eq!(timestamps, vec![0, 500]);

    let raw = decoder
        .decode_bytes(
            encoder.as_bytes(),
            &DecoderConfig::new().with_epoch_normalization(false),
        )
        .unwrap();
    let timestamps: Vec<u32> = raw.series.timestamps.iter().copied().collect();
    assert_eq!(timestamps, vec![5_000_000, 5_000_500]);
}

#[test]
fn test_unknown_channel_uses_identity_scaling() {
    let mut encoder = FrameEncoder::new();
    encoder.write_group(0, &[(77, -12)]).unwrap();

    let log = Decoder::new(scaled_registry())
        .decode_bytes(encoder.as_bytes(), &DecoderConfig::new())
        .unwrap();

    assert_eq!(log.series.get("77").unwrap().get(0), Some(-12.0));
    assert_eq!(
        log.diagnostics,
        vec![Diagnostic::UnknownChannel {
            offset: 0,
            channel_id: 77
        }]
    );
}

#[test]
fn test_mismatch_is_fatal_but_partial_data_survives() {
    let mut encoder = FrameEncoder::new();
    encoder.write_group(10, &[(3, 1), (4, 2)]).unwrap();
    let mut data = encoder.into_bytes();
    data.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x02, 0x14, 0x00, 0x00, 0x00]);

    let decoder = Decoder::new(scaled_registry());
    let err = decoder
        .decode_bytes(&data, &DecoderConfig::new())
        .unwrap_err();
    assert!(matches!(
        err,
        DecoderError::FramingMismatch {
            offset: 16,
            expected: 2,
            actual: 0
        }
    ));

    let outcome = decoder.decode_partial(&data, &DecoderConfig::new());
    assert!(outcome.error.is_some());
    let table = outcome.log.to_table(LeadingFill::FirstKnown);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].values, vec![2.0, 2.0]);
}

#[test]
fn test_sample_and_hold_across_channels() {
    let mut encoder = FrameEncoder::new();
    encoder.write_group(0, &[(3, 1)]).unwrap();
    encoder.write_group(50, &[(4, 4)]).unwrap();
    encoder.write_group(100, &[(3, 2)]).unwrap();
    let decoder = Decoder::new(scaled_registry());

    let table = decoder
        .convert_bytes(encoder.as_bytes(), &DecoderConfig::new())
        .unwrap();
    assert_eq!(table.column_values("Accel X"), Some(vec![2.0, 2.0, 4.0]));
    assert_eq!(table.column_values("Accel Y"), Some(vec![3.0, 3.0, 3.0]));

    let config = DecoderConfig::new().with_leading_fill(LeadingFill::Missing);
    let table = decoder.convert_bytes(encoder.as_bytes(), &config).unwrap();
    let y = table.column_values("Accel Y").unwrap();
    assert!(y[0].is_nan());
    assert_eq!(&y[1..], &[3.0, 3.0]);
}

#[test]
fn test_fixed8_records() {
    let mut data = Vec::new();
    data.extend(encode_fixed8(3, 1000, 5).unwrap());
    data.extend(encode_fixed8(4, 1010, -2).unwrap());

    let decoder = Decoder::new(scaled_registry());
    let config = DecoderConfig::new().with_framing(FramingMode::Fixed8);
    let table = decoder.convert_bytes(&data, &config).unwrap();

    let timestamps: Vec<u32> = table.rows.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 1010]);
    assert_eq!(table.column_values("Accel X"), Some(vec![10.0, 10.0]));
    assert_eq!(table.column_values("Accel Y"), Some(vec![0.0, 0.0]));
}

#[test]
fn test_fixed12_legacy_log() {
    let mut data = FIXED12_PREAMBLE.to_vec();
    data.extend(encode_fixed12(1, 0, 12.5));
    data.extend(encode_fixed12(2, 0, 14.5));
    data.extend(encode_fixed12(1, 20, 13.0));

    let decoder = Decoder::new(ChannelRegistry::legacy_logger());
    let config = DecoderConfig::new().with_framing(FramingMode::Fixed12);
    let log = decoder.decode_bytes(&data, &config).unwrap();

    assert_eq!(log.stats.groups, 3);
    assert_eq!(log.stats.bytes_consumed, data.len());
    let table = log.to_table(config.leading_fill);
    assert_eq!(
        table.column_values("GyroX (degrees)"),
        Some(vec![12.5, 13.0])
    );
    assert_eq!(
        table.column_values("Air Pressure (psi)"),
        Some(vec![14.5, 14.5])
    );
}

#[test]
fn test_fixed12_wide_channel_id_is_unknown_channel() {
    let mut data = FIXED12_PREAMBLE.to_vec();
    data.extend(encode_fixed12(1, 0, 1.0));
    data.extend(encode_fixed12(2, 0, 14.5));
    data.extend(encode_fixed12(300, 10, 7.5));
    data.extend(encode_fixed12(1, 20, 2.0));

    let decoder = Decoder::new(ChannelRegistry::legacy_logger());
    let config = DecoderConfig::new().with_framing(FramingMode::Fixed12);
    let log = decoder.decode_bytes(&data, &config).unwrap();

    assert_eq!(log.stats.groups, 4);
    assert_eq!(
        log.diagnostics,
        vec![Diagnostic::UnknownChannel {
            offset: 32,
            channel_id: 300
        }]
    );

    let table = log.to_table(config.leading_fill);
    assert_eq!(
        table.channels,
        vec!["300", "Air Pressure (psi)", "GyroX (degrees)"]
    );
    assert_eq!(table.column_values("300"), Some(vec![7.5, 7.5, 7.5]));
    assert_eq!(
        table.column_values("GyroX (degrees)"),
        Some(vec![1.0, 1.0, 2.0])
    );
}

#[test]
fn test_decode_file_roundtrip_through_disk() {
    let mut encoder = FrameEncoder::new();
    encoder.write_group(42, &[(3, 21)]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight.bin");
    std::fs::write(&path, encoder.as_bytes()).unwrap();

    let log = Decoder::new(scaled_registry())
        .decode_file(&path, &DecoderConfig::new())
        .unwrap();
    assert_eq!(log.series.get("Accel X").unwrap().get(0), Some(42.0));
}

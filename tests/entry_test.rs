mod common;

use rand::Rng;
use sv39_pte::{Field, FieldOutOfRange, PTEFlags, PageTableEntry};

#[test]
fn raw_round_trip() {
    common::init_logger();
    let mut rng = common::rng();

    for x in [0, 1, u64::MAX, 0x8000_0000_0000_0000, 0x003f_ffff_ffff_fc00] {
        assert_eq!(PageTableEntry::from_raw(x).to_raw(), x);
    }
    for _ in 0..common::ROUNDS {
        let x = rng.gen::<u64>();
        assert_eq!(PageTableEntry::from_raw(x).to_raw(), x);
        assert_eq!(u64::from(PageTableEntry::from(x)), x);
    }
}

#[test]
fn field_matches_bit_position() {
    common::init_logger();
    let mut rng = common::rng();

    for _ in 0..common::ROUNDS {
        let x = rng.gen::<u64>();
        let pte = PageTableEntry::from_raw(x);
        for field in Field::ALL {
            assert_eq!(
                pte.get_field(field),
                (x >> field.offset()) & field.mask(),
                "field {} of 0x{:x}",
                field,
                x
            );
        }
    }
}

#[test]
fn ppn_splits_into_segments() {
    common::init_logger();
    let mut rng = common::rng();

    for _ in 0..common::ROUNDS {
        let p = common::value_for(&mut rng, Field::Ppn);
        let mut pte = PageTableEntry::from_raw(rng.gen());
        pte.set_ppn(p).unwrap();

        assert_eq!(pte.ppn0(), p & 0x1ff);
        assert_eq!(pte.ppn1(), (p >> 9) & 0x1ff);
        assert_eq!(pte.ppn2(), (p >> 18) & 0x3ff_ffff);
    }
}

#[test]
fn segments_join_into_ppn() {
    common::init_logger();
    let mut rng = common::rng();

    for _ in 0..common::ROUNDS {
        let p0 = common::value_for(&mut rng, Field::Ppn0);
        let p1 = common::value_for(&mut rng, Field::Ppn1);
        let p2 = common::value_for(&mut rng, Field::Ppn2);

        let mut pte = PageTableEntry::from_raw(rng.gen());
        pte.set_ppn0(p0).unwrap();
        pte.set_ppn1(p1).unwrap();
        pte.set_ppn2(p2).unwrap();

        assert_eq!(pte.ppn(), p0 | (p1 << 9) | (p2 << 18));
    }
}

#[test]
fn fields_are_independent() {
    common::init_logger();
    let mut rng = common::rng();

    // The aliasing group is excluded: writing one of its members changes the others.
    let ppn_group = [Field::Ppn, Field::Ppn0, Field::Ppn1, Field::Ppn2];
    let aliased = |a: Field, b: Field| ppn_group.contains(&a) && ppn_group.contains(&b);

    for _ in 0..common::ROUNDS / 8 {
        let before = PageTableEntry::from_raw(rng.gen());
        for target in Field::ALL {
            let value = common::value_for(&mut rng, target);
            let after = before.with_field(target, value).unwrap();
            assert_eq!(after.get_field(target), value);

            for other in Field::ALL {
                if other == target || aliased(other, target) {
                    continue;
                }
                assert_eq!(
                    after.get_field(other),
                    before.get_field(other),
                    "writing {} changed {}",
                    target,
                    other
                );
            }
        }
    }
}

#[test]
fn set_dirty_only_touches_d() {
    common::init_logger();

    let mut pte = PageTableEntry::from_raw(0x0000_0000_2000_0c4f);
    pte.set_field(Field::D, 1).unwrap();
    assert_eq!(pte.to_raw(), 0x0000_0000_2000_0c4f | 1 << 7);
    pte.set_field(Field::D, 0).unwrap();
    assert_eq!(pte.to_raw(), 0x0000_0000_2000_0c4f);
}

#[test]
fn out_of_range() {
    common::init_logger();

    for field in Field::FLAGS {
        let mut pte = PageTableEntry::empty();
        assert!(pte.set_field(field, 0).is_ok());
        assert!(pte.set_field(field, 1).is_ok());
        assert_eq!(
            pte.set_field(field, 2),
            Err(FieldOutOfRange { field, value: 2 })
        );
        assert_eq!(pte.get_field(field), 1);
    }

    let mut pte = PageTableEntry::empty();
    assert!(pte.set_ppn2((1 << 26) - 1).is_ok());
    assert_eq!(
        pte.set_ppn2(1 << 26),
        Err(FieldOutOfRange {
            field: Field::Ppn2,
            value: 1 << 26,
        })
    );
    assert!(pte.set_ppn(1 << 44).is_err());
    assert!(pte.set_rsw(4).is_err());
    assert!(pte.set_reserved(1 << 10).is_err());
    assert_eq!(pte.ppn2(), (1 << 26) - 1);

    let err = PageTableEntry::new(1 << 44, PTEFlags::V).unwrap_err();
    assert_eq!(
        err.to_string(),
        "value 0x100000000000 does not fit in ppn (44 bits, max 0xfffffffffff)"
    );
}

#[test]
fn example_entries() {
    common::init_logger();

    let pte = PageTableEntry::from_raw(0x3);
    assert_eq!(pte.get_field(Field::V), 1);
    assert_eq!(pte.get_field(Field::R), 1);
    assert_eq!(pte.get_field(Field::W), 0);
    assert_eq!(pte.get_field(Field::Ppn), 0);

    let pte = PageTableEntry::empty()
        .with_field(Field::Ppn, 0x1)
        .and_then(|pte| pte.with_field(Field::V, 1))
        .unwrap();
    assert_eq!(pte.ppn0(), 1);
    assert_eq!(pte.ppn1(), 0);
    assert_eq!(pte.ppn2(), 0);
    assert_eq!(pte.to_raw(), 0x401);
}

#[test]
fn reserved_bits_are_kept() {
    common::init_logger();

    let mut pte = PageTableEntry::from_raw(0xffc0_0000_0000_0000);
    assert_eq!(pte.reserved(), 0x3ff);
    pte.set_flags(PTEFlags::V | PTEFlags::R | PTEFlags::W);
    pte.set_ppn(0x80000).unwrap();
    assert_eq!(pte.reserved(), 0x3ff);
    assert_eq!(pte.to_raw(), 0xffc0_0000_2000_0007);
}

#[test]
fn flags_view_matches_fields() {
    common::init_logger();
    let mut rng = common::rng();

    for _ in 0..common::ROUNDS {
        let pte = PageTableEntry::from_raw(rng.gen());
        let flags = pte.flags();
        for (bit, field) in Field::FLAGS.iter().enumerate() {
            let expected = flags.bits() >> bit & 1;
            assert_eq!(pte.get_field(*field), expected as u64);
        }
        assert_eq!(pte.is_dirty(), pte.get_field(Field::D) == 1);
        assert_eq!(pte.is_user(), pte.get_field(Field::U) == 1);
    }
}

#[test]
fn parse_field_names() {
    for name in ["V", "R", "W", "X", "U", "G", "A", "D", "RSW", "PPN0", "PPN1", "PPN2", "ppn"] {
        let field = Field::from_name(name).unwrap();
        assert_eq!(field.name(), name);
    }
    assert_eq!(Field::from_name("Reserved"), Some(Field::Reserved));
    assert_eq!(Field::from_name("PPN3"), None);
}

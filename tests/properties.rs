use chip8::display::{PixelBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8::{Chip8Interpreter, Keypad};
use proptest::prelude::*;

/// run one ALU op on V1, V2 and hand back (V1, VF)
fn alu(op: u8, a: u8, b: u8) -> (u8, u8) {
    let mut cpu = Chip8Interpreter::with_seed(0);
    cpu.load_bytes(&[0x61, a, 0x62, b, 0x81, 0x20 | op]).unwrap();
    let mut keys = Keypad::new();
    for _ in 0..3 {
        cpu.step(&mut keys).unwrap();
    }
    (cpu.registers()[1], cpu.registers()[0xf])
}

proptest! {
    #[test]
    fn add_sets_carry(a in any::<u8>(), b in any::<u8>()) {
        let (value, flag) = alu(0x4, a, b);
        prop_assert_eq!(value, a.wrapping_add(b));
        prop_assert_eq!(flag == 1, (a as u16) + (b as u16) > 255);
    }

    #[test]
    fn sub_sets_no_borrow(a in any::<u8>(), b in any::<u8>()) {
        let (value, flag) = alu(0x5, a, b);
        prop_assert_eq!(value, a.wrapping_sub(b));
        prop_assert_eq!(flag == 1, a > b);
    }

    #[test]
    fn reverse_sub_sets_no_borrow(a in any::<u8>(), b in any::<u8>()) {
        let (value, flag) = alu(0x7, a, b);
        prop_assert_eq!(value, b.wrapping_sub(a));
        prop_assert_eq!(flag == 1, a < b);
    }

    #[test]
    fn shifts_read_vy(a in any::<u8>(), b in any::<u8>()) {
        prop_assert_eq!(alu(0x6, a, b), (b >> 1, b & 1));
        prop_assert_eq!(alu(0xe, a, b), (b << 1, b >> 7));
    }

    #[test]
    fn drawing_twice_restores_frame(
        x in any::<u8>(),
        y in any::<u8>(),
        sprite in proptest::collection::vec(any::<u8>(), 1..=15),
        background in proptest::collection::vec((0..DISPLAY_WIDTH, 0..DISPLAY_HEIGHT), 0..40),
    ) {
        let mut before = PixelBuffer::new();
        for (px, py) in background {
            before.draw_sprite(px, py, &[0x80]);
        }
        let mut frame = before.clone();
        frame.draw_sprite(x as usize, y as usize, &sprite);
        let after_first = frame.clone();
        let second = frame.draw_sprite(x as usize, y as usize, &sprite);

        prop_assert_eq!(&frame, &before);
        let lit_by_first = sprite_cells(x, y, &sprite)
            .into_iter()
            .any(|(cx, cy)| after_first.get(cx, cy));
        prop_assert_eq!(second, lit_by_first);
    }

    #[test]
    fn draw_instruction_twice_blanks_and_flags(
        x in any::<u8>(),
        y in any::<u8>(),
        sprite in proptest::collection::vec(any::<u8>(), 1..=15),
    ) {
        let n = sprite.len() as u8;
        // ld v0, x; ld v1, y; ld i, 0x300; drw v0, v1, n; drw v0, v1, n; sprite at 0x300
        let mut program = vec![0x60, x, 0x61, y, 0xa3, 0x00, 0xd0, 0x10 | n, 0xd0, 0x10 | n];
        program.resize(0x100, 0);
        program.extend_from_slice(&sprite);
        let mut cpu = Chip8Interpreter::with_seed(0);
        cpu.load_bytes(&program).unwrap();
        let mut keys = Keypad::new();
        for _ in 0..4 {
            cpu.step(&mut keys).unwrap();
        }
        let after_first = cpu.frame().clone();
        prop_assert_eq!(cpu.registers()[0xf], 0);

        cpu.step(&mut keys).unwrap();
        prop_assert!(cpu.frame().is_blank());
        prop_assert_eq!(cpu.registers()[0xf] == 1, !after_first.is_blank());
    }

    #[test]
    fn clear_always_blanks(points in proptest::collection::vec((0u8..64, 0u8..32), 0..64)) {
        let mut program = Vec::new();
        // ld i, font 0; then a draw per point, then cls
        program.extend_from_slice(&[0xa0, 0x50]);
        for (x, y) in &points {
            program.extend_from_slice(&[0x60, *x, 0x61, *y, 0xd0, 0x15]);
        }
        program.extend_from_slice(&[0x00, 0xe0]);
        let mut cpu = Chip8Interpreter::with_seed(0);
        cpu.load_bytes(&program).unwrap();
        let mut keys = Keypad::new();
        for _ in 0..(1 + points.len() * 3 + 1) {
            cpu.step(&mut keys).unwrap();
        }
        prop_assert!(cpu.frame().is_blank());
    }
}

/// on-screen cells covered by the set bits of a sprite drawn at (x, y)
fn sprite_cells(x: u8, y: u8, sprite: &[u8]) -> Vec<(usize, usize)> {
    let x = x as usize % DISPLAY_WIDTH;
    let y = y as usize % DISPLAY_HEIGHT;
    let mut cells = Vec::new();
    for (row, byte) in sprite.iter().enumerate() {
        for bit in 0..8 {
            let (cx, cy) = (x + bit, y + row);
            if byte & (0x80u8 >> bit) != 0 && cx < DISPLAY_WIDTH && cy < DISPLAY_HEIGHT {
                cells.push((cx, cy));
            }
        }
    }
    cells
}

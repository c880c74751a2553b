use std::fmt;

/// The 35 recognized CHIP 8 instructions, each carrying its decoded operands, plus
/// `NoOp` for every word the dispatch tables don't recognize.
///
/// Ops produced by `DispatchTable::decode` have register operands between 0x0 and 0xF and
/// addresses that fit in 12 bits. Hand built ops are brought into range by `masked`
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Op {
    // 0XXX
    // 00E0 	Display 	disp_clear() 	Clears the screen.
    DispClear,
    // 00EE 	Flow 	return; 	Returns from a subroutine.
    Return,

    // 1NNN 	Flow 	goto NNN;
    Goto(u16),
    // 2NNN 	Flow 	*(0xNNN)()
    GotoSubRtn(u16),
    // 3XNN 	Cond 	if(Vx==NN) skip
    CondVxEq(u8, u8),
    // 4XNN 	Cond 	if(Vx!=NN) skip
    CondVxNe(u8, u8),
    // 5XY0 	Cond 	if(Vx==Vy) skip
    CondVxVyEq(u8, u8),
    // 6XNN 	Const 	Vx = NN
    ConstSetVx(u8, u8),
    // 7XNN 	Const 	Vx += NN, carry flag untouched
    ConstAddVx(u8, u8),

    // 8XYZ
    AssignVyToVx(u8, u8),
    BitOpOr(u8, u8),
    BitOpAnd(u8, u8),
    BitOpXor(u8, u8),
    MathVxAddVy(u8, u8),
    MathVxMinusVy(u8, u8),
    BitOpRtShift(u8),
    MathVyMinusVx(u8, u8),
    BitOpLftShift(u8),

    // 9XY0 	Cond 	if(Vx!=Vy) skip
    CondVxVyNe(u8, u8),
    // ANNN 	MEM 	I = NNN
    MemSetI(u16),
    // BNNN 	Flow 	PC = V0 + NNN
    GotoPlusV0(u16),
    // CXNN 	Rand 	Vx = rand() & NN
    Rand(u8, u8),
    // DXYN 	Disp 	draw(Vx, Vy, N)
    DispDraw(u8, u8, u8),

    // EXXX
    KeyOpEqVx(u8),
    KeyOpNeVx(u8),

    // FXXX
    DelayGet(u8),
    KeyOpGet(u8),
    DelaySet(u8),
    SoundSet(u8),
    MemIPlusEqVx(u8),
    MemISetSprite(u8),
    Bcd(u8),
    RegDump(u8),
    RegLoad(u8),

    /// Any word without a populated table slot. Executes as a no-op
    NoOp(u16),
}

impl Op {
    /// Returns true if executing this op changes the pixel buffer
    pub fn is_display_op(&self) -> bool {
        matches!(self, Op::DispClear | Op::DispDraw(..))
    }

    /// The same op with every register operand and sprite height cut to a nibble,
    /// and every address cut to 12 bits, the widths an instruction word can encode
    pub fn masked(self) -> Self {
        let r = |n: u8| n & 0xF;
        let a = |addr: u16| addr & 0x0FFF;

        match self {
            Op::DispClear => Op::DispClear,
            Op::Return => Op::Return,
            Op::Goto(addr) => Op::Goto(a(addr)),
            Op::GotoSubRtn(addr) => Op::GotoSubRtn(a(addr)),
            Op::CondVxEq(x, nn) => Op::CondVxEq(r(x), nn),
            Op::CondVxNe(x, nn) => Op::CondVxNe(r(x), nn),
            Op::CondVxVyEq(x, y) => Op::CondVxVyEq(r(x), r(y)),
            Op::ConstSetVx(x, nn) => Op::ConstSetVx(r(x), nn),
            Op::ConstAddVx(x, nn) => Op::ConstAddVx(r(x), nn),
            Op::AssignVyToVx(x, y) => Op::AssignVyToVx(r(x), r(y)),
            Op::BitOpOr(x, y) => Op::BitOpOr(r(x), r(y)),
            Op::BitOpAnd(x, y) => Op::BitOpAnd(r(x), r(y)),
            Op::BitOpXor(x, y) => Op::BitOpXor(r(x), r(y)),
            Op::MathVxAddVy(x, y) => Op::MathVxAddVy(r(x), r(y)),
            Op::MathVxMinusVy(x, y) => Op::MathVxMinusVy(r(x), r(y)),
            Op::BitOpRtShift(x) => Op::BitOpRtShift(r(x)),
            Op::MathVyMinusVx(x, y) => Op::MathVyMinusVx(r(x), r(y)),
            Op::BitOpLftShift(x) => Op::BitOpLftShift(r(x)),
            Op::CondVxVyNe(x, y) => Op::CondVxVyNe(r(x), r(y)),
            Op::MemSetI(addr) => Op::MemSetI(a(addr)),
            Op::GotoPlusV0(addr) => Op::GotoPlusV0(a(addr)),
            Op::Rand(x, nn) => Op::Rand(r(x), nn),
            Op::DispDraw(x, y, n) => Op::DispDraw(r(x), r(y), r(n)),
            Op::KeyOpEqVx(x) => Op::KeyOpEqVx(r(x)),
            Op::KeyOpNeVx(x) => Op::KeyOpNeVx(r(x)),
            Op::DelayGet(x) => Op::DelayGet(r(x)),
            Op::KeyOpGet(x) => Op::KeyOpGet(r(x)),
            Op::DelaySet(x) => Op::DelaySet(r(x)),
            Op::SoundSet(x) => Op::SoundSet(r(x)),
            Op::MemIPlusEqVx(x) => Op::MemIPlusEqVx(r(x)),
            Op::MemISetSprite(x) => Op::MemISetSprite(r(x)),
            Op::Bcd(x) => Op::Bcd(r(x)),
            Op::RegDump(x) => Op::RegDump(r(x)),
            Op::RegLoad(x) => Op::RegLoad(r(x)),
            Op::NoOp(word) => Op::NoOp(word),
        }
    }

    /// Build the op for `tag`, pulling its operand fields out of `word`
    fn with_operands(tag: OpTag, word: u16) -> Self {
        let x = ((word >> 8) & 0xF) as u8;
        let y = ((word >> 4) & 0xF) as u8;
        let n = (word & 0xF) as u8;
        let nn = (word & 0xFF) as u8;
        let nnn = word & 0x0FFF;

        match tag {
            OpTag::DispClear => Op::DispClear,
            OpTag::Return => Op::Return,
            OpTag::Goto => Op::Goto(nnn),
            OpTag::GotoSubRtn => Op::GotoSubRtn(nnn),
            OpTag::CondVxEq => Op::CondVxEq(x, nn),
            OpTag::CondVxNe => Op::CondVxNe(x, nn),
            OpTag::CondVxVyEq => Op::CondVxVyEq(x, y),
            OpTag::ConstSetVx => Op::ConstSetVx(x, nn),
            OpTag::ConstAddVx => Op::ConstAddVx(x, nn),
            OpTag::AssignVyToVx => Op::AssignVyToVx(x, y),
            OpTag::BitOpOr => Op::BitOpOr(x, y),
            OpTag::BitOpAnd => Op::BitOpAnd(x, y),
            OpTag::BitOpXor => Op::BitOpXor(x, y),
            OpTag::MathVxAddVy => Op::MathVxAddVy(x, y),
            OpTag::MathVxMinusVy => Op::MathVxMinusVy(x, y),
            OpTag::BitOpRtShift => Op::BitOpRtShift(x),
            OpTag::MathVyMinusVx => Op::MathVyMinusVx(x, y),
            OpTag::BitOpLftShift => Op::BitOpLftShift(x),
            OpTag::CondVxVyNe => Op::CondVxVyNe(x, y),
            OpTag::MemSetI => Op::MemSetI(nnn),
            OpTag::GotoPlusV0 => Op::GotoPlusV0(nnn),
            OpTag::Rand => Op::Rand(x, nn),
            OpTag::DispDraw => Op::DispDraw(x, y, n),
            OpTag::KeyOpEqVx => Op::KeyOpEqVx(x),
            OpTag::KeyOpNeVx => Op::KeyOpNeVx(x),
            OpTag::DelayGet => Op::DelayGet(x),
            OpTag::KeyOpGet => Op::KeyOpGet(x),
            OpTag::DelaySet => Op::DelaySet(x),
            OpTag::SoundSet => Op::SoundSet(x),
            OpTag::MemIPlusEqVx => Op::MemIPlusEqVx(x),
            OpTag::MemISetSprite => Op::MemISetSprite(x),
            OpTag::Bcd => Op::Bcd(x),
            OpTag::RegDump => Op::RegDump(x),
            OpTag::RegLoad => Op::RegLoad(x),
            OpTag::NoOp => Op::NoOp(word),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::NoOp(word) => write!(f, "NoOp({:#06X})", word),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Operand-free name of an instruction, the value stored in the dispatch tables
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum OpTag {
    DispClear,
    Return,
    Goto,
    GotoSubRtn,
    CondVxEq,
    CondVxNe,
    CondVxVyEq,
    ConstSetVx,
    ConstAddVx,
    AssignVyToVx,
    BitOpOr,
    BitOpAnd,
    BitOpXor,
    MathVxAddVy,
    MathVxMinusVy,
    BitOpRtShift,
    MathVyMinusVx,
    BitOpLftShift,
    CondVxVyNe,
    MemSetI,
    GotoPlusV0,
    Rand,
    DispDraw,
    KeyOpEqVx,
    KeyOpNeVx,
    DelayGet,
    KeyOpGet,
    DelaySet,
    SoundSet,
    MemIPlusEqVx,
    MemISetSprite,
    Bcd,
    RegDump,
    RegLoad,
    NoOp,
}

/// What a leading nibble maps to: a single instruction, or one of the four
/// families that share a leading nibble and need a second lookup
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum Family {
    Direct(OpTag),
    System,     // 0x00KK, keyed by low byte
    Arithmetic, // 0x8XYK, keyed by low nibble
    Keypad,     // 0xEXKK, keyed by low byte
    Timers,     // 0xFXKK, keyed by low byte
}

/// Two level opcode lookup. Every secondary slot starts out as `NoOp` so
/// decoding never has to check whether a slot was populated
pub struct DispatchTable {
    primary: [Family; 16],
    system: [OpTag; 256],
    arithmetic: [OpTag; 16],
    keypad: [OpTag; 256],
    timers: [OpTag; 256],
}

impl DispatchTable {
    pub fn new() -> Self {
        let primary = [
            Family::System,
            Family::Direct(OpTag::Goto),
            Family::Direct(OpTag::GotoSubRtn),
            Family::Direct(OpTag::CondVxEq),
            Family::Direct(OpTag::CondVxNe),
            Family::Direct(OpTag::CondVxVyEq),
            Family::Direct(OpTag::ConstSetVx),
            Family::Direct(OpTag::ConstAddVx),
            Family::Arithmetic,
            Family::Direct(OpTag::CondVxVyNe),
            Family::Direct(OpTag::MemSetI),
            Family::Direct(OpTag::GotoPlusV0),
            Family::Direct(OpTag::Rand),
            Family::Direct(OpTag::DispDraw),
            Family::Keypad,
            Family::Timers,
        ];

        let mut system = [OpTag::NoOp; 256];
        system[0xE0] = OpTag::DispClear;
        system[0xEE] = OpTag::Return;

        let mut arithmetic = [OpTag::NoOp; 16];
        arithmetic[0x0] = OpTag::AssignVyToVx;
        arithmetic[0x1] = OpTag::BitOpOr;
        arithmetic[0x2] = OpTag::BitOpAnd;
        arithmetic[0x3] = OpTag::BitOpXor;
        arithmetic[0x4] = OpTag::MathVxAddVy;
        arithmetic[0x5] = OpTag::MathVxMinusVy;
        arithmetic[0x6] = OpTag::BitOpRtShift;
        arithmetic[0x7] = OpTag::MathVyMinusVx;
        arithmetic[0xE] = OpTag::BitOpLftShift;

        let mut keypad = [OpTag::NoOp; 256];
        keypad[0x9E] = OpTag::KeyOpEqVx;
        keypad[0xA1] = OpTag::KeyOpNeVx;

        let mut timers = [OpTag::NoOp; 256];
        timers[0x07] = OpTag::DelayGet;
        timers[0x0A] = OpTag::KeyOpGet;
        timers[0x15] = OpTag::DelaySet;
        timers[0x18] = OpTag::SoundSet;
        timers[0x1E] = OpTag::MemIPlusEqVx;
        timers[0x29] = OpTag::MemISetSprite;
        timers[0x33] = OpTag::Bcd;
        timers[0x55] = OpTag::RegDump;
        timers[0x65] = OpTag::RegLoad;

        DispatchTable {
            primary,
            system,
            arithmetic,
            keypad,
            timers,
        }
    }

    /// Decode an instruction word into the op it names
    pub fn decode(&self, word: u16) -> Op {
        let low_byte = (word & 0xFF) as usize;

        let tag = match self.primary[((word & 0xF000) >> 12) as usize] {
            Family::Direct(tag) => tag,
            Family::System => self.system[low_byte],
            Family::Arithmetic => self.arithmetic[(word & 0xF) as usize],
            Family::Keypad => self.keypad[low_byte],
            Family::Timers => self.timers[low_byte],
        };

        Op::with_operands(tag, word)
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_opcodes() {
        let table = DispatchTable::new();

        let cases = [
            (0x00E0, Op::DispClear),
            (0x00EE, Op::Return),
            (0x1FAB, Op::Goto(0xFAB)),
            (0x2AAA, Op::GotoSubRtn(0xAAA)),
            (0x3FAA, Op::CondVxEq(0xF, 0xAA)),
            (0x4FAA, Op::CondVxNe(0xF, 0xAA)),
            (0x5FA0, Op::CondVxVyEq(0xF, 0xA)),
            (0x6FAB, Op::ConstSetVx(0xF, 0xAB)),
            (0x7FAB, Op::ConstAddVx(0xF, 0xAB)),
            (0x8FA0, Op::AssignVyToVx(0xF, 0xA)),
            (0x8FA1, Op::BitOpOr(0xF, 0xA)),
            (0x8FA2, Op::BitOpAnd(0xF, 0xA)),
            (0x8FA3, Op::BitOpXor(0xF, 0xA)),
            (0x8FA4, Op::MathVxAddVy(0xF, 0xA)),
            (0x8FA5, Op::MathVxMinusVy(0xF, 0xA)),
            (0x8FA6, Op::BitOpRtShift(0xF)),
            (0x8FA7, Op::MathVyMinusVx(0xF, 0xA)),
            (0x8FAE, Op::BitOpLftShift(0xF)),
            (0x9FA0, Op::CondVxVyNe(0xF, 0xA)),
            (0xAFAB, Op::MemSetI(0xFAB)),
            (0xBFAB, Op::GotoPlusV0(0xFAB)),
            (0xCFAB, Op::Rand(0xF, 0xAB)),
            (0xDFAB, Op::DispDraw(0xF, 0xA, 0xB)),
            (0xEF9E, Op::KeyOpEqVx(0xF)),
            (0xEFA1, Op::KeyOpNeVx(0xF)),
            (0xF907, Op::DelayGet(0x9)),
            (0xF90A, Op::KeyOpGet(0x9)),
            (0xF915, Op::DelaySet(0x9)),
            (0xF918, Op::SoundSet(0x9)),
            (0xF91E, Op::MemIPlusEqVx(0x9)),
            (0xF929, Op::MemISetSprite(0x9)),
            (0xF933, Op::Bcd(0x9)),
            (0xF955, Op::RegDump(0x9)),
            (0xF965, Op::RegLoad(0x9)),
        ];

        for (word, op) in cases.iter() {
            assert_eq!(table.decode(*word), *op, "decoding {:#06X}", word);
        }
    }

    #[test]
    fn unknown_words_decode_to_noop() {
        let table = DispatchTable::new();

        // machine code calls, unused arithmetic slots and unused E/F keys
        for word in &[0x0000, 0x0FFF, 0x00E1, 0x8DEF, 0x8AB8, 0xED9F, 0xE0A2, 0xFDEF, 0xF000] {
            assert_eq!(table.decode(*word), Op::NoOp(*word));
        }
    }

    #[test]
    fn direct_families_ignore_trailing_nibble() {
        let table = DispatchTable::new();

        assert_eq!(table.decode(0x5AB3), Op::CondVxVyEq(0xA, 0xB));
        assert_eq!(table.decode(0x9ABF), Op::CondVxVyNe(0xA, 0xB));
    }

    #[test]
    fn masked_keeps_decoded_ops_and_trims_wide_operands() {
        let table = DispatchTable::new();
        for word in &[0x6A42, 0x8FAE, 0xDFAB, 0xF965, 0xBFAB] {
            let op = table.decode(*word);
            assert_eq!(op.masked(), op);
        }

        assert_eq!(Op::ConstSetVx(0x10, 1).masked(), Op::ConstSetVx(0x0, 1));
        assert_eq!(Op::RegDump(0x2F).masked(), Op::RegDump(0xF));
        assert_eq!(Op::DispDraw(0x11, 0xF2, 0x20).masked(), Op::DispDraw(0x1, 0x2, 0x0));
        assert_eq!(Op::Goto(0xF234).masked(), Op::Goto(0x234));
    }

    #[test]
    fn display_ops() {
        assert!(Op::DispClear.is_display_op());
        assert!(Op::DispDraw(0, 1, 5).is_display_op());
        assert!(!Op::Return.is_display_op());
        assert!(!Op::NoOp(0x0123).is_display_op());
    }

    #[test]
    fn display_formats_noop_word() {
        assert_eq!(Op::NoOp(0x8AB8).to_string(), "NoOp(0x8AB8)");
        assert_eq!(Op::Goto(0x200).to_string(), "Goto(512)");
    }
}

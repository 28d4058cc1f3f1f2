use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_BODY_LEN: usize = 6;

/// Generates human-facing booking references such as `SW4K9ZQA`
#[derive(Debug, Clone)]
pub struct ConfirmationCodeGenerator {
    prefix: String,
}

impl ConfirmationCodeGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut code = String::with_capacity(self.prefix.len() + CODE_BODY_LEN);
        code.push_str(&self.prefix);
        for _ in 0..CODE_BODY_LEN {
            let idx = rng.gen_range(0..CHARSET.len());
            code.push(CHARSET[idx] as char);
        }
        code
    }
}

impl Default for ConfirmationCodeGenerator {
    fn default() -> Self {
        Self::new("SW")
    }
}

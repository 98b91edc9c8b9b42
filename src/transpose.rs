/// Splits `ciphertext` into `key_length` columns, where column `i` holds
/// byte `i` of every `key_length`-byte block. A short final block only
/// contributes to the columns it reaches.
pub fn transpose(ciphertext: &[u8], key_length: usize) -> Vec<Vec<u8>> {
    if key_length == 0 {
        return Vec::new();
    }

    let rows = (ciphertext.len() + key_length - 1) / key_length;
    let mut columns: Vec<Vec<u8>> = vec![Vec::with_capacity(rows); key_length];

    for block in ciphertext.chunks(key_length) {
        for (column, &byte) in columns.iter_mut().zip(block) {
            column.push(byte);
        }
    }

    columns
}

//! Parsing de caminhos

/// Iterador sobre componentes de caminho (ignora vazios e ".")
pub struct PathComponents<'a> {
    remaining: &'a str,
}

impl<'a> PathComponents<'a> {
    pub fn new(path: &'a str) -> Self {
        // Remover / inicial
        let path = path.strip_prefix('/').unwrap_or(path);
        Self { remaining: path }
    }
}

impl<'a> Iterator for PathComponents<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining.is_empty() {
                return None;
            }

            let component = match self.remaining.find('/') {
                Some(pos) => {
                    let component = &self.remaining[..pos];
                    self.remaining = &self.remaining[pos + 1..];
                    component
                }
                None => {
                    let component = self.remaining;
                    self.remaining = "";
                    component
                }
            };

            if component.is_empty() || component == "." {
                continue;
            }
            return Some(component);
        }
    }
}

/// Verifica se caminho é absoluto
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Separa `"a/b/c"` em `("a/b", "c")`.
///
/// Retorna `None` quando não há último componente nomeável
/// (`"/"`, `"."`, `".."`, vazio).
pub fn split_last(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let (dir, name) = match trimmed.rfind('/') {
        Some(0) => ("/", &trimmed[1..]),
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => (".", trimmed),
    };

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_skip_empty_and_dot() {
        let parts: Vec<&str> = PathComponents::new("/a//./b/../c/").collect();
        assert_eq!(parts, vec!["a", "b", "..", "c"]);
    }

    #[test]
    fn test_split_last() {
        assert_eq!(split_last("/tmp/f"), Some(("/tmp", "f")));
        assert_eq!(split_last("/f"), Some(("/", "f")));
        assert_eq!(split_last("f"), Some((".", "f")));
        assert_eq!(split_last("/tmp/d/"), Some(("/tmp", "d")));
        assert_eq!(split_last("/"), None);
        assert_eq!(split_last("/tmp/.."), None);
    }
}

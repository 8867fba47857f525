/// Scripts compiled into the binary, by name
pub const SCRIPTS: &[(&str, &str)] = &[("polita", POLITA), ("valentine", VALENTINE)];

/// Name of the script used when none is given
pub const DEFAULT_SCRIPT: &str = "polita";

const POLITA: &str = r#"# PolitaOS love letter
[intro]
booting PolitaOS v1.4.14...
checking system mood... romantic {{heart}}
initializing terminal...
...
...
...
Loading love_letter.txt...

Hola mi Polita hermosa. Hoy estás igual de hermosa que siempre. {{flower awkard}}
Te hice esta consola porque estaba pensando en ti y me di cuenta que te amo desde el fondo de mi corazón. Eres la mujer más hermosa, increíble y maravillosa que he conocido. Y entonces me di cuenta que quería hacerte algo especial para ti, nada más y nada menos que para hacerte una simple pregunta...
......
Do you want to be my special valentine this year mailov? {{be my valentine!}}

Escoge sabiamente:
 - [Sipi] [FATAL: PERMISSION_DENIED_0x403]
 - [Nopi]

[unlock]
.
Ok veamos... voy a intentar a las malas. Perdóname pero es que soy nuevo en linux. {{dumb}}
chmod 400: love_letter.txt
sudo --askpass "will you be my valentine?"
auth success ✅
permission updated: [Yes] is now enabled.

Yattaaaa! ya puedes volver a intentar jejeje {{yipeeee}}

[accepted]
.
Input received: YES
compiling sillyness... done.
deploying cuddles... done.
shipping kisses... done.

Me has hecho el hombre más feliz del mundo! {{heartie}}
Te amo mucho Polita. Feliz día de San Valentín! {{valentine}}

Quedas cordialmente invitada a una cena conmigo el día de hoy, donde te prometo que disfrutaremos mucho del romance y de nuestro amor. {{love}}
......
Espero que hayas disfrutado tu PolitaOS terminal.
...
...
...
...
Te amo Polita. Eres el amor de mi vida. Gracias por ser tú. :)

[denied]
.
permission denied: cannot execute 'Yes' 😅

[decline]
recalculating... maybe you misclicked? {{IMG:sad}}
hmm... let me check the manual real quick... {{IMG:fun}}
trying editing permissions... nope, still locked {{IMG:sad}}
maybe if I restart the system? {{IMG:fun}}
checking Stack Overflow for solutions... {{IMG:fun}}
does turning it off and on again work? {{IMG:sad}}
deploying emergency heart protocols... {{IMG:fun}}
accessing backup romantic plans... {{IMG:sad}}
okay I'm getting creative now... {{IMG:fun}}
alright, time for admin privileges... {{IMG:sad}}

[escalate]
okay okay, enough. escalating privileges...
"#;

const VALENTINE: &str = r#"# Text-only variant
[intro]
booting ValentineOS v2.0.0...
checking system mood... romantic
...
Loading question.txt...

Do you want to be my valentine?

Choose wisely:
 - [Yes] [FATAL: PERMISSION_DENIED_0x403]
 - [No]

[unlock]
.
sudo --askpass "will you be my valentine?"
auth success
permission updated: [Yes] is now enabled.

[accepted]
.
Input received: YES
compiling sillyness... done.
deploying cuddles... done.

Happy Valentine's day! :)

[decline]
recalculating... maybe you misclicked?
hmm... let me check the manual real quick...
trying editing permissions... nope, still locked
maybe if I restart the system?
does turning it off and on again work?
"#;

/// Source of a builtin script
pub fn source(name: &str) -> Option<&'static str> {
    SCRIPTS
        .iter()
        .find(|(script_name, _)| *script_name == name)
        .map(|(_, source)| *source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssetCatalog;
    use crate::script::Script;

    #[test]
    fn test_builtin_scripts_parse() {
        for (name, source) in SCRIPTS {
            let script = Script::parse(source).unwrap_or_else(|e| panic!("{}: {}", name, e));
            assert!(!script.intro.is_empty());
            assert!(!script.decline.is_empty());
        }
    }

    #[test]
    fn test_builtin_scripts_have_no_unknown_images() {
        let catalog = AssetCatalog::builtin();
        for (name, source) in SCRIPTS {
            assert!(Script::lint(source, &catalog).is_empty(), "{}", name);
        }
    }

    #[test]
    fn test_polita_layout() {
        let script = Script::parse(POLITA).unwrap();
        assert_eq!(script.intro.len(), 16);
        assert_eq!(script.intro[7], "");
        assert_eq!(script.unlock[0], "");
        assert_eq!(script.accepted.len(), 17);
        assert_eq!(script.decline.len(), 10);
        assert_eq!(script.denied[1], "permission denied: cannot execute 'Yes' 😅");
    }
}

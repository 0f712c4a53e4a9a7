//! `proxygen` - generate a proxy for a synthetic target and print its IR.

use proxy_contrib::ProxyKind;
use proxy_gen::{init_tracing, GeneratorConfig, ProxyGenerator, ProxyRequest};
use proxy_ir::{TypeId, TypeInfo};

struct Options {
    target: String,
    kind: ProxyKind,
    interfaces: Vec<String>,
    type_id: Option<String>,
    namespace: Option<String>,
    base: Option<String>,
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_usage();
        return;
    }

    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(message) = run(&options) {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut target = None;
    let mut kind = ProxyKind::Class;
    let mut interfaces = Vec::new();
    let mut type_id = None;
    let mut namespace = None;
    let mut base = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let value = |i: usize| {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("`{arg}` needs a value"))
        };
        match arg {
            "--interface" | "-i" => {
                interfaces.push(value(i)?);
                i += 2;
            }
            "--type-id" => {
                type_id = Some(value(i)?);
                i += 2;
            }
            "--base" => {
                base = Some(value(i)?);
                i += 2;
            }
            "--namespace" => {
                namespace = Some(value(i)?);
                i += 2;
            }
            "--kind" => {
                kind = match value(i)?.as_str() {
                    "class" => ProxyKind::Class,
                    "interface" => ProxyKind::Interface,
                    other => return Err(format!("unknown proxy kind `{other}`")),
                };
                i += 2;
            }
            _ if arg.starts_with('-') => return Err(format!("unknown option `{arg}`")),
            _ if target.is_none() => {
                target = Some(arg.to_owned());
                i += 1;
            }
            _ => return Err(format!("unexpected argument `{arg}`")),
        }
    }

    let target = target.ok_or_else(|| "missing target type name".to_owned())?;
    Ok(Options {
        target,
        kind,
        interfaces,
        type_id,
        namespace,
        base,
    })
}

/// Split `acme.Foo` into (`Foo`, `acme.Foo`).
fn names(qualified: &str) -> (&str, &str) {
    let short = qualified.rsplit('.').next().unwrap_or(qualified);
    (short, qualified)
}

fn run(options: &Options) -> Result<(), String> {
    let mut config = GeneratorConfig::default();
    if let Some(namespace) = &options.namespace {
        config.namespace.clone_from(namespace);
    }
    let generator = ProxyGenerator::new(config);
    let define = |info: TypeInfo| generator.define_type(info).map_err(|err| err.to_string());

    let interfaces = options
        .interfaces
        .iter()
        .map(|qualified| {
            let (short, qualified) = names(qualified);
            define(TypeInfo::interface(short, qualified))
        })
        .collect::<Result<Vec<TypeId>, String>>()?;

    let (short, qualified) = names(&options.target);
    let target = match options.kind {
        ProxyKind::Interface => define(TypeInfo::interface(short, qualified))?,
        ProxyKind::Class => define(
            interfaces
                .iter()
                .fold(TypeInfo::class(short, qualified), |info, &interface| {
                    info.with_interface(interface)
                }),
        )?,
    };

    let mut request = match options.kind {
        ProxyKind::Interface => ProxyRequest::interface(target),
        ProxyKind::Class => ProxyRequest::class(target),
    }
    .with_interfaces(interfaces);
    if let Some(id) = &options.type_id {
        request = request.with_type_id(id.as_str());
    }
    if let Some(base) = &options.base {
        let (short, qualified) = names(base);
        let base = define(TypeInfo::class(short, qualified).with_interface(TypeId::SERIALIZABLE))?;
        request = request.with_base(base);
    }

    let proxy = generator.generate(&request).map_err(|err| err.to_string())?;
    generator.with_pool(|pool| {
        println!(
            "// {} : {}",
            pool.qualified_name(proxy.type_id()),
            pool.qualified_name(proxy.base_type())
        );
        for field in proxy.fields() {
            let modifier = if field.is_static() { "static " } else { "" };
            println!("{modifier}{}: {};", field.name(), pool.name(field.ty()));
        }
        for method in proxy.methods() {
            println!();
            println!("{}", method.display(pool, proxy.fields()));
        }
    });
    Ok(())
}

fn print_usage() {
    eprintln!("Usage: proxygen <target> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --kind <class|interface>   Proxy kind (default: class)");
    eprintln!("  -i, --interface <name>     Additional interface (repeatable)");
    eprintln!("  --type-id <id>             Proxy type id to persist");
    eprintln!("  --namespace <ns>           Namespace of the generated type");
    eprintln!("  --base <name>              Serializable base class of an interface proxy");
    eprintln!();
    eprintln!("Set RUST_LOG=proxy_ir=debug,proxy_gen=trace to log the generation pass.");
}
